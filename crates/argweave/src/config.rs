//! Construction-time parser options.

use serde::{Deserialize, Serialize};

/// Nesting limit applied unless the configuration overrides it.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What to do with tokens that bind to no declared argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unknown keywords and excess positionals go to `leftover`.
    #[default]
    Lenient,
    /// Unknown keywords and excess positionals are errors.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDelimiters {
    pub open: String,
    pub close: String,
}

impl Default for ListDelimiters {
    fn default() -> Self {
        Self {
            open: "[".to_string(),
            close: "]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDelimiters {
    pub open: String,
    pub separator: String,
    pub close: String,
}

impl Default for MappingDelimiters {
    fn default() -> Self {
        Self {
            open: "{".to_string(),
            separator: ":".to_string(),
            close: "}".to_string(),
        }
    }
}

/// Parser configuration.
///
/// Every field has a default, so a schema file may set any subset of them.
/// `list`/`mapping` set to `null` disable that literal family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    pub flag_prefix: String,
    pub keyword_separator: String,
    pub list: Option<ListDelimiters>,
    pub mapping: Option<MappingDelimiters>,
    pub strictness: Strictness,
    /// Marker after which every token is positional. `None` disables it.
    pub end_of_options: Option<String>,
    /// Maximum literal nesting depth. `None` is unlimited.
    pub max_depth: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flag_prefix: "-".to_string(),
            keyword_separator: "=".to_string(),
            list: Some(ListDelimiters::default()),
            mapping: Some(MappingDelimiters::default()),
            strictness: Strictness::Lenient,
            end_of_options: Some("--".to_string()),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.flag_prefix = prefix.into();
        self
    }

    pub fn keyword_separator(mut self, separator: impl Into<String>) -> Self {
        self.keyword_separator = separator.into();
        self
    }

    pub fn list_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.list = Some(ListDelimiters {
            open: open.into(),
            close: close.into(),
        });
        self
    }

    pub fn without_lists(mut self) -> Self {
        self.list = None;
        self
    }

    pub fn mapping_delimiters(
        mut self,
        open: impl Into<String>,
        separator: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        self.mapping = Some(MappingDelimiters {
            open: open.into(),
            separator: separator.into(),
            close: close.into(),
        });
        self
    }

    pub fn without_mappings(mut self) -> Self {
        self.mapping = None;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn end_of_options(mut self, marker: Option<String>) -> Self {
        self.end_of_options = marker;
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn unlimited_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }

    pub(crate) fn is_list_close(&self, t: &str) -> bool {
        self.list.as_ref().is_some_and(|l| t == l.close)
    }

    pub(crate) fn is_mapping_close(&self, t: &str) -> bool {
        self.mapping.as_ref().is_some_and(|m| t == m.close)
    }

    /// Closing delimiter glued to the end of `t`, if any.
    pub(crate) fn trailing_closer(&self, t: &str) -> Option<&str> {
        let list = self.list.as_ref().map(|l| l.close.as_str());
        let mapping = self.mapping.as_ref().map(|m| m.close.as_str());
        [list, mapping]
            .into_iter()
            .flatten()
            .find(|close| !close.is_empty() && t.ends_with(close))
    }

    /// Whether `t` starts a list or mapping literal (possibly glued).
    pub(crate) fn opens_container(&self, t: &str) -> bool {
        let list = self
            .list
            .as_ref()
            .is_some_and(|l| !l.open.is_empty() && t.starts_with(&l.open));
        let mapping = self
            .mapping
            .as_ref()
            .is_some_and(|m| !m.open.is_empty() && t.starts_with(&m.open));
        list || mapping
    }

    /// Whether `t` is shaped like a flag: introducer followed by a name.
    ///
    /// `-5` and `-.5` are values, not flags.
    pub(crate) fn looks_like_flag(&self, t: &str) -> bool {
        if self.flag_prefix.is_empty() {
            return false;
        }
        t.strip_prefix(self.flag_prefix.as_str())
            .map(|rest| rest.trim_start_matches(self.flag_prefix.as_str()))
            .and_then(|name| name.chars().next())
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    }
}
