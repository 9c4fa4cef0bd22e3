//! Declarative argument schema.
//!
//! A command declares an ordered `Vec<ArgSpec>` once; each parse call borrows it
//! immutably.

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};
use crate::value::{ParsedValue, Scalar, ScalarType};

/// How an argument may be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgKind {
    PositionalOnly,
    #[default]
    PositionalOrKeyword,
    KeywordOnly,
    VariadicPositional,
    VariadicKeyword,
}

impl ArgKind {
    /// Whether the argument may absorb an un-prefixed token.
    pub fn accepts_positional(self) -> bool {
        matches!(
            self,
            Self::PositionalOnly | Self::PositionalOrKeyword | Self::VariadicPositional
        )
    }

    /// Whether the argument may be named on the command line.
    pub fn accepts_keyword(self) -> bool {
        matches!(self, Self::PositionalOrKeyword | Self::KeywordOnly)
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, Self::VariadicPositional | Self::VariadicKeyword)
    }
}

/// Declared value type: a free scalar type or a fixed set of choices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Any,
    Str,
    Int,
    Float,
    Bool,
    Choices(Vec<Scalar>),
}

impl ValueType {
    /// Scalar type used to decode tokens for this value type.
    ///
    /// Choices decode with the type of their values, which must agree.
    pub fn scalar_type(&self, arg_name: &str) -> ParseResult<ScalarType> {
        Ok(match self {
            Self::Any => ScalarType::Any,
            Self::Str => ScalarType::Str,
            Self::Int => ScalarType::Int,
            Self::Float => ScalarType::Float,
            Self::Bool => ScalarType::Bool,
            Self::Choices(values) => {
                let mut types = values.iter().map(Scalar::scalar_type);
                let Some(first) = types.next() else {
                    return Ok(ScalarType::Any);
                };
                if types.any(|t| t != first) {
                    return Err(ParseError::MixedChoiceTypes {
                        name: arg_name.to_string(),
                    });
                }
                first
            }
        })
    }

    /// True for `Bool` and for choices made only of booleans.
    pub fn is_bool(&self) -> bool {
        matches!(self.scalar_type(""), Ok(ScalarType::Bool))
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ArgKind,
    /// Accepted external names. Empty means the canonical name only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    /// `None` means no default was declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParsedValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl ArgSpec {
    pub fn new(kind: ArgKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(ArgKind::PositionalOrKeyword, name)
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(ArgKind::PositionalOnly, name)
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(ArgKind::KeywordOnly, name)
    }

    /// A keyword-only boolean switch.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(ArgKind::KeywordOnly, name).ty(ValueType::Bool)
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self::new(ArgKind::VariadicPositional, name)
    }

    pub fn variadic_keywords(name: impl Into<String>) -> Self {
        Self::new(ArgKind::VariadicKeyword, name)
    }

    /// Add an accepted name. The canonical name stays accepted.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if self.aliases.is_empty() {
            self.aliases.push(self.name.clone());
        }
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Replace the accepted names entirely.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn ty(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn choices<I, S>(self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        self.ty(ValueType::Choices(choices.into_iter().map(Into::into).collect()))
    }

    pub fn default_value(mut self, value: impl Into<ParsedValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Iterate the accepted names, falling back to the canonical name.
    pub fn accepted_names(&self) -> impl Iterator<Item = &str> {
        let fallback = self.aliases.is_empty().then_some(self.name.as_str());
        self.aliases.iter().map(String::as_str).chain(fallback)
    }

    /// Whether `name` (already stripped of the flag introducer) selects this
    /// argument. Aliases declared with a leading introducer still match.
    pub fn answers_to(&self, name: &str, flag_prefix: &str) -> bool {
        self.accepted_names()
            .any(|alias| normalize_alias(alias, flag_prefix) == name)
    }
}

fn normalize_alias<'a>(alias: &'a str, flag_prefix: &str) -> &'a str {
    let alias = alias.trim();
    if flag_prefix.is_empty() {
        alias
    } else {
        alias.trim_start_matches(flag_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_keeps_canonical_name() {
        let spec = ArgSpec::positional("ifile").alias("i").alias("if");
        let names: Vec<&str> = spec.accepted_names().collect();
        assert_eq!(names, vec!["ifile", "i", "if"]);
    }

    #[test]
    fn empty_aliases_fall_back_to_name() {
        let spec = ArgSpec::keyword("rot");
        assert!(spec.answers_to("rot", "-"));
        assert!(!spec.answers_to("r", "-"));
    }

    #[test]
    fn aliases_written_as_flags_still_match() {
        let spec = ArgSpec::flag("verbose").names(["-v", "--verbose"]);
        assert!(spec.answers_to("v", "-"));
        assert!(spec.answers_to("verbose", "-"));
        assert!(!spec.answers_to("-v", "-"));
    }

    #[test]
    fn boolean_choices_count_as_bool() {
        assert!(ValueType::Bool.is_bool());
        assert!(ValueType::Choices(vec![Scalar::Bool(true), Scalar::Bool(false)]).is_bool());
        assert!(!ValueType::Choices(vec![Scalar::Int(1)]).is_bool());
        assert!(!ValueType::Choices(vec![Scalar::Bool(true), Scalar::Int(1)]).is_bool());
        assert!(!ValueType::Choices(Vec::new()).is_bool());
        assert!(!ValueType::Any.is_bool());
    }

    #[test]
    fn choices_decode_with_their_own_type() {
        let spec = ArgSpec::keyword("level").choices([1i64, 2, 3]);
        assert_eq!(spec.value_type.scalar_type("level"), Ok(ScalarType::Int));

        let mixed = ValueType::Choices(vec![Scalar::Int(1), Scalar::Str("x".into())]);
        match mixed.scalar_type("level") {
            Err(ParseError::MixedChoiceTypes { name }) => assert_eq!(name, "level"),
            other => panic!("expected MixedChoiceTypes, got: {other:?}"),
        }
    }

    #[test]
    fn kinds_gate_positional_and_keyword_use() {
        assert!(ArgKind::PositionalOnly.accepts_positional());
        assert!(!ArgKind::PositionalOnly.accepts_keyword());
        assert!(ArgKind::PositionalOrKeyword.accepts_keyword());
        assert!(!ArgKind::KeywordOnly.accepts_positional());
        assert!(ArgKind::VariadicPositional.accepts_positional());
        assert!(!ArgKind::VariadicKeyword.accepts_keyword());
    }

    #[test]
    fn deserializes_from_schema_json() {
        let spec: ArgSpec = serde_json::from_str(
            r#"{
                "name": "rot",
                "kind": "keyword-only",
                "type": "int",
                "default": 13,
                "doc": "The rotation amount"
            }"#,
        )
        .unwrap();
        assert_eq!(spec.kind, ArgKind::KeywordOnly);
        assert_eq!(spec.value_type, ValueType::Int);
        assert_eq!(spec.default, Some(ParsedValue::from(13i64)));
        assert!(!spec.required);

        let spec: ArgSpec =
            serde_json::from_str(r#"{"name": "fmt", "type": {"choices": ["plain", "json"]}}"#)
                .unwrap();
        assert_eq!(spec.kind, ArgKind::PositionalOrKeyword);
        assert_eq!(spec.value_type.scalar_type("fmt"), Ok(ScalarType::Str));
    }
}
