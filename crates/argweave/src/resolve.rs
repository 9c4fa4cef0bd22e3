//! Token resolver: the single pass that binds argv tokens to declared args.

use indexmap::IndexMap;
use std::borrow::Cow;

use crate::config::{ParserConfig, Strictness};
use crate::cursor::TokenCursor;
use crate::decode::DecoderRegistry;
use crate::error::{ParseError, ParseResult};
use crate::literal::{LiteralReader, is_identifier};
use crate::outcome::{Binding, ParseOutcome};
use crate::spec::{ArgKind, ArgSpec};
use crate::value::ParsedValue;

/// Parser for argv-style token lists.
///
/// Immutable after construction; one instance may serve any number of parse
/// calls, including concurrent ones.
#[derive(Debug, Clone, Default)]
pub struct ArgParser {
    config: ParserConfig,
    decoders: DecoderRegistry,
}

impl ArgParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            decoders: DecoderRegistry::default(),
        }
    }

    pub fn decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Bind `tokens` against `specs`.
    ///
    /// Unknown keywords and excess positionals land in
    /// [`ParseOutcome::leftover`] unless the parser is strict. Unbound specs are
    /// not an error here; see [`ParseOutcome::ensure_complete`].
    pub fn parse<'s, S: AsRef<str>>(
        &self,
        specs: &'s [ArgSpec],
        tokens: &[S],
    ) -> ParseResult<ParseOutcome<'s>> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        Resolver::new(self, specs, &tokens).run()
    }

    /// Parse a single value (scalar or literal) from the front of `tokens`,
    /// decoding scalars for `spec`. Returns the value and the unread tokens.
    pub fn parse_value<S: AsRef<str>>(
        &self,
        tokens: &[S],
        spec: Option<&ArgSpec>,
    ) -> ParseResult<Option<(ParsedValue, Vec<String>)>> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let mut cursor = TokenCursor::new(&tokens);
        let Some(first) = cursor.next() else {
            return Ok(None);
        };
        let reader = LiteralReader::new(&self.config, self.decoders.passthrough());
        let decoder = self.decoders.resolve(spec)?;
        let value = reader.read_value(first, &mut cursor, decoder)?;
        Ok(Some((value, cursor.drain_rest())))
    }
}

struct Resolver<'p, 's, 't> {
    config: &'p ParserConfig,
    decoders: &'p DecoderRegistry,
    reader: LiteralReader<'p>,
    specs: &'s [ArgSpec],
    consumed: Vec<bool>,
    variadic_keywords: Option<usize>,
    cursor: TokenCursor<'t>,
    options_ended: bool,
    outcome: ParseOutcome<'s>,
}

impl<'p, 's, 't> Resolver<'p, 's, 't> {
    fn new(parser: &'p ArgParser, specs: &'s [ArgSpec], tokens: &'t [&'t str]) -> Self {
        Self {
            config: &parser.config,
            decoders: &parser.decoders,
            reader: LiteralReader::new(&parser.config, parser.decoders.passthrough()),
            specs,
            consumed: vec![false; specs.len()],
            variadic_keywords: specs
                .iter()
                .position(|s| s.kind == ArgKind::VariadicKeyword),
            cursor: TokenCursor::new(tokens),
            options_ended: false,
            outcome: ParseOutcome::default(),
        }
    }

    fn run(mut self) -> ParseResult<ParseOutcome<'s>> {
        while let Some(token) = self.cursor.next() {
            if self.schema_exhausted() && self.config.strictness == Strictness::Lenient {
                tracing::trace!(token = %token, "no arguments left, forwarding rest");
                self.outcome.leftover.push(token.into_owned());
                self.outcome.leftover.extend(self.cursor.drain_rest());
                break;
            }

            if !self.options_ended {
                if self.config.end_of_options.as_deref() == Some(&*token) {
                    self.options_ended = true;
                    continue;
                }
                if self.config.looks_like_flag(&token) {
                    self.flag(&token)?;
                    continue;
                }
                if self.bare_keyword(&token)? {
                    continue;
                }
            }

            self.positional(token)?;
        }
        Ok(self.outcome)
    }

    /// True once every spec is consumed. Variadic specs are never consumed.
    fn schema_exhausted(&self) -> bool {
        self.consumed.iter().all(|c| *c)
    }

    fn find_keyword(&self, name: &str) -> Option<usize> {
        self.specs.iter().enumerate().position(|(i, s)| {
            !self.consumed[i]
                && s.kind.accepts_keyword()
                && s.answers_to(name, &self.config.flag_prefix)
        })
    }

    fn is_bound_keyword(&self, name: &str) -> bool {
        self.specs.iter().enumerate().any(|(i, s)| {
            self.consumed[i]
                && s.kind.accepts_keyword()
                && s.answers_to(name, &self.config.flag_prefix)
        })
    }

    fn next_positional(&self) -> Option<usize> {
        self.specs
            .iter()
            .enumerate()
            .position(|(i, s)| !self.consumed[i] && s.kind.accepts_positional())
    }

    /// `-name`, `--name`, `-name=value`.
    fn flag(&mut self, token: &str) -> ParseResult<()> {
        let name_part = token.trim_start_matches(self.config.flag_prefix.as_str());
        let sep = self.config.keyword_separator.as_str();
        let (name, inline) = match name_part.split_once(sep) {
            Some((name, value)) if !sep.is_empty() => (name, Some(value)),
            _ => (name_part, None),
        };

        match self.find_keyword(name) {
            Some(idx) => self.bind_keyword(idx, inline),
            None => self.unknown_keyword(token, name, inline),
        }
    }

    /// `name=value` without the flag introducer. Returns false when the token
    /// is not a keyword for any remaining spec, leaving it to the positional
    /// path.
    fn bare_keyword(&mut self, token: &str) -> ParseResult<bool> {
        let sep = self.config.keyword_separator.as_str();
        if sep.is_empty() {
            return Ok(false);
        }
        let Some((name, value)) = token.split_once(sep) else {
            return Ok(false);
        };
        if !is_identifier(name) {
            return Ok(false);
        }
        let Some(idx) = self.find_keyword(name) else {
            return Ok(false);
        };
        self.bind_keyword(idx, Some(value))?;
        Ok(true)
    }

    fn takes_following_value(&self, spec: &ArgSpec) -> bool {
        if spec.value_type.is_bool() {
            return false;
        }
        self.cursor.peek().is_some_and(|next| {
            !self.config.looks_like_flag(next)
                && self.config.end_of_options.as_deref() != Some(next)
        })
    }

    /// First token of a keyword's value: the inline text after the separator,
    /// or the following token when the separator had nothing after it.
    fn keyword_value_token(&mut self, inline: Option<&str>) -> Option<Cow<'t, str>> {
        match inline {
            Some(v) if !v.is_empty() => Some(Cow::Owned(v.to_string())),
            Some(_) => self.cursor.next(),
            None => None,
        }
    }

    fn bind_keyword(&mut self, idx: usize, inline: Option<&str>) -> ParseResult<()> {
        let specs = self.specs;
        let spec = &specs[idx];
        let token = match inline {
            None if self.takes_following_value(spec) => self.cursor.next(),
            _ => self.keyword_value_token(inline),
        };
        let value = match token {
            Some(t) => {
                let decoder = self.decoders.resolve(Some(spec))?;
                self.reader.read_value(t, &mut self.cursor, decoder)?
            }
            None => ParsedValue::from(true),
        };

        tracing::debug!(arg = %spec.name, "bound keyword");
        self.consumed[idx] = true;
        self.outcome
            .keywords
            .insert(spec.name.clone(), Binding { spec, value });
        Ok(())
    }

    fn unknown_keyword(
        &mut self,
        token: &str,
        name: &str,
        inline: Option<&str>,
    ) -> ParseResult<()> {
        // A repeated keyword is not a new name for the catch-all mapping.
        if let Some(idx) = self.variadic_keywords {
            if !self.is_bound_keyword(name) {
                return self.absorb_keyword(idx, name, inline);
            }
        }
        if self.config.strictness == Strictness::Strict {
            return Err(ParseError::UnknownKeyword {
                name: name.to_string(),
            });
        }

        tracing::trace!(token, "unknown keyword, forwarding");
        match inline {
            Some(v) if v.is_empty() || self.config.opens_container(v) => {
                let head = &token[..token.len() - v.len()];
                self.outcome.leftover.push(head.to_string());
                if let Some(t) = self.keyword_value_token(inline) {
                    let raw = self.reader.read_raw(t, &mut self.cursor)?;
                    self.outcome.leftover.extend(raw);
                }
            }
            _ => self.outcome.leftover.push(token.to_string()),
        }
        Ok(())
    }

    fn absorb_keyword(
        &mut self,
        idx: usize,
        name: &str,
        inline: Option<&str>,
    ) -> ParseResult<()> {
        let specs = self.specs;
        let spec = &specs[idx];
        let value = match self.keyword_value_token(inline) {
            Some(t) => {
                let decoder = self.decoders.resolve(Some(spec))?;
                self.reader.read_value(t, &mut self.cursor, decoder)?
            }
            None => ParsedValue::from(true),
        };

        tracing::debug!(arg = %spec.name, keyword = name, "absorbed keyword");
        let binding = self
            .outcome
            .keywords
            .entry(spec.name.clone())
            .or_insert_with(|| Binding {
                spec,
                value: ParsedValue::Mapping(IndexMap::new()),
            });
        if let ParsedValue::Mapping(entries) = &mut binding.value {
            entries.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn positional(&mut self, token: Cow<'t, str>) -> ParseResult<()> {
        let Some(idx) = self.next_positional() else {
            if self.config.strictness == Strictness::Strict {
                return Err(ParseError::UnexpectedPositional {
                    token: token.into_owned(),
                });
            }
            tracing::trace!(token = %token, "no positional argument left, forwarding");
            let raw = self.reader.read_raw(token, &mut self.cursor)?;
            self.outcome.leftover.extend(raw);
            return Ok(());
        };

        let specs = self.specs;
        let spec = &specs[idx];
        let decoder = self.decoders.resolve(Some(spec))?;
        let value = self.reader.read_value(token, &mut self.cursor, decoder)?;

        tracing::debug!(arg = %spec.name, "bound positional");
        if spec.kind != ArgKind::VariadicPositional {
            self.consumed[idx] = true;
        }
        self.outcome.positionals.push(Binding { spec, value });
        Ok(())
    }
}
