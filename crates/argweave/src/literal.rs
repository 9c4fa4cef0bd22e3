//! Composite literal reader.
//!
//! Lists and mappings arrive already split on whitespace, so a literal such as
//! `[1 2 3]` is three tokens: `[1`, `2`, `3]`. The reader peels glued
//! delimiters off their neighbours and then runs an ordinary recursive descent
//! over the resulting token stream:
//!
//! ```text
//! value   := list | mapping | scalar
//! list    := OPEN value* CLOSE
//! mapping := OPEN (IDENT SEP value)* CLOSE
//! ```

use indexmap::IndexMap;
use std::borrow::Cow;

use crate::config::ParserConfig;
use crate::cursor::TokenCursor;
use crate::decode::ValueDecoder;
use crate::error::{ParseError, ParseResult};
use crate::value::ParsedValue;

pub(crate) struct LiteralReader<'p> {
    config: &'p ParserConfig,
    passthrough: &'p dyn ValueDecoder,
}

impl<'p> LiteralReader<'p> {
    pub(crate) fn new(config: &'p ParserConfig, passthrough: &'p dyn ValueDecoder) -> Self {
        Self {
            config,
            passthrough,
        }
    }

    /// Parse one value whose first token is `token`, reading any further
    /// tokens a container literal needs from `cursor`.
    pub(crate) fn read_value(
        &self,
        token: Cow<'_, str>,
        cursor: &mut TokenCursor<'_>,
        decoder: &dyn ValueDecoder,
    ) -> ParseResult<ParsedValue> {
        self.value_at(token, cursor, decoder, 0)
    }

    /// Consume one value without binding it and return it as normalized
    /// tokens that re-parse to the same value.
    pub(crate) fn read_raw(
        &self,
        token: Cow<'_, str>,
        cursor: &mut TokenCursor<'_>,
    ) -> ParseResult<Vec<String>> {
        if !self.config.opens_container(&token) {
            return Ok(vec![token.into_owned()]);
        }
        let value = self.value_at(token, cursor, self.passthrough, 0)?;
        let mut out = Vec::new();
        self.render(&value, &mut out);
        Ok(out)
    }

    fn value_at(
        &self,
        token: Cow<'_, str>,
        cursor: &mut TokenCursor<'_>,
        decoder: &dyn ValueDecoder,
        depth: usize,
    ) -> ParseResult<ParsedValue> {
        if let Some(list) = &self.config.list {
            if !list.open.is_empty() {
                if let Some(rest) = token.strip_prefix(list.open.as_str()) {
                    self.check_depth(depth + 1)?;
                    if !rest.is_empty() {
                        cursor.push_front(rest);
                    }
                    return self.read_list(cursor, decoder, depth + 1);
                }
            }
        }
        if let Some(mapping) = &self.config.mapping {
            if !mapping.open.is_empty() {
                if let Some(rest) = token.strip_prefix(mapping.open.as_str()) {
                    self.check_depth(depth + 1)?;
                    if !rest.is_empty() {
                        cursor.push_front(rest);
                    }
                    return self.read_mapping(cursor, decoder, depth + 1);
                }
            }
        }
        Ok(ParsedValue::Scalar(decoder.decode(&token)?))
    }

    fn check_depth(&self, depth: usize) -> ParseResult<()> {
        match self.config.max_depth {
            Some(limit) if depth > limit => Err(ParseError::NestingTooDeep { limit }),
            _ => Ok(()),
        }
    }

    fn read_list(
        &self,
        cursor: &mut TokenCursor<'_>,
        decoder: &dyn ValueDecoder,
        depth: usize,
    ) -> ParseResult<ParsedValue> {
        let close = self.config.list.as_ref().map(|l| l.close.as_str()).unwrap_or_default();

        let mut items = Vec::new();
        loop {
            let Some(t) = cursor.next() else {
                return Err(ParseError::UnterminatedLiteral {
                    expected: close.to_string(),
                });
            };
            if self.config.is_mapping_close(&t) {
                return Err(ParseError::MismatchedClosingDelimiter {
                    found: t.into_owned(),
                    expected: close.to_string(),
                });
            }
            if self.config.is_list_close(&t) {
                return Ok(ParsedValue::Sequence(items));
            }

            // A genuinely empty token is a value; a remainder emptied by
            // splitting off closers is not.
            let was_empty = t.is_empty();
            let t = self.split_closers(t, cursor);
            if t.is_empty() && !was_empty {
                continue;
            }
            items.push(self.value_at(Cow::Owned(t), cursor, decoder, depth)?);
        }
    }

    fn read_mapping(
        &self,
        cursor: &mut TokenCursor<'_>,
        decoder: &dyn ValueDecoder,
        depth: usize,
    ) -> ParseResult<ParsedValue> {
        let (separator, close) = self
            .config
            .mapping
            .as_ref()
            .map(|m| (m.separator.as_str(), m.close.as_str()))
            .unwrap_or_default();
        let unterminated = || ParseError::UnterminatedLiteral {
            expected: close.to_string(),
        };
        let bad_entry = |token: &str| ParseError::InvalidEntrySyntax {
            token: token.to_string(),
            expected: format!("key{separator}value"),
        };

        let mut entries = IndexMap::new();
        loop {
            let t = cursor.next().ok_or_else(unterminated)?;
            if self.config.is_list_close(&t) {
                return Err(ParseError::MismatchedClosingDelimiter {
                    found: t.into_owned(),
                    expected: close.to_string(),
                });
            }
            if self.config.is_mapping_close(&t) {
                return Ok(ParsedValue::Mapping(entries));
            }

            let was_empty = t.is_empty();
            let t = self.split_closers(t, cursor);
            if t.is_empty() && !was_empty {
                continue;
            }
            let (key, rest) = split_entry(&t, separator).ok_or_else(|| bad_entry(&t))?;

            // `key:` with the value in the following token.
            let value_token = if rest.is_empty() {
                let next = cursor.next().ok_or_else(unterminated)?;
                if self.config.is_list_close(&next) || self.config.is_mapping_close(&next) {
                    return Err(bad_entry(&t));
                }
                let was_empty = next.is_empty();
                let next = self.split_closers(next, cursor);
                if next.is_empty() && !was_empty {
                    return Err(bad_entry(&t));
                }
                next
            } else {
                rest.to_string()
            };

            let value = self.value_at(Cow::Owned(value_token), cursor, decoder, depth)?;
            entries.insert(key.to_string(), value);
        }
    }

    /// Strip the run of closing delimiters glued to the end of `t`, pushing
    /// each back onto the cursor so they are read next, in order.
    fn split_closers(&self, t: Cow<'_, str>, cursor: &mut TokenCursor<'_>) -> String {
        let mut t = t.into_owned();
        while let Some(close) = self.config.trailing_closer(&t) {
            t.truncate(t.len() - close.len());
            cursor.push_front(close);
        }
        t
    }

    fn render(&self, value: &ParsedValue, out: &mut Vec<String>) {
        match value {
            ParsedValue::Scalar(s) => out.push(s.to_string()),
            ParsedValue::Sequence(items) => {
                let Some(list) = &self.config.list else {
                    return;
                };
                out.push(list.open.clone());
                for item in items {
                    self.render(item, out);
                }
                out.push(list.close.clone());
            }
            ParsedValue::Mapping(entries) => {
                let Some(mapping) = &self.config.mapping else {
                    return;
                };
                out.push(mapping.open.clone());
                for (key, value) in entries {
                    let mut sub = Vec::new();
                    self.render(value, &mut sub);
                    let mut sub = sub.into_iter();
                    let first = sub.next().unwrap_or_default();
                    out.push(format!("{key}{}{first}", mapping.separator));
                    out.extend(sub);
                }
                out.push(mapping.close.clone());
            }
        }
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    identifier_len(s) == s.len() && !s.is_empty()
}

fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Split `key<sep>rest` where `key` is an identifier.
fn split_entry<'a>(t: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let n = identifier_len(t);
    if n == 0 {
        return None;
    }
    let rest = t[n..].strip_prefix(separator)?;
    Some((&t[..n], rest))
}
