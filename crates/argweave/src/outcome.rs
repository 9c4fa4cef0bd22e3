use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{ParseError, ParseResult};
use crate::spec::ArgSpec;
use crate::value::ParsedValue;

/// A declared argument together with the value bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<'s> {
    pub spec: &'s ArgSpec,
    pub value: ParsedValue,
}

impl Serialize for Binding<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Binding", 2)?;
        s.serialize_field("name", &self.spec.name)?;
        s.serialize_field("value", &self.value)?;
        s.end()
    }
}

/// Result of one parse call.
///
/// `leftover` keeps every token that bound to nothing, in stream order, so it
/// can be handed to a nested parser unchanged.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ParseOutcome<'s> {
    pub positionals: Vec<Binding<'s>>,
    pub keywords: IndexMap<String, Binding<'s>>,
    pub leftover: Vec<String>,
}

impl<'s> ParseOutcome<'s> {
    /// The value bound to `name`, by keyword or by position.
    ///
    /// For a variadic positional this is the last value absorbed.
    pub fn get(&self, name: &str) -> Option<&ParsedValue> {
        if let Some(b) = self.keywords.get(name) {
            return Some(&b.value);
        }
        self.positionals
            .iter()
            .rev()
            .find(|b| b.spec.name == name)
            .map(|b| &b.value)
    }

    /// Every positional value bound to `name`, in order.
    pub fn values_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ParsedValue> {
        self.positionals
            .iter()
            .filter(move |b| b.spec.name == name)
            .map(|b| &b.value)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The bound value, or the declared default when nothing was bound.
    pub fn value_or_default<'a>(&'a self, spec: &'a ArgSpec) -> Option<&'a ParsedValue> {
        self.get(&spec.name).or(spec.default.as_ref())
    }

    /// Required arguments that nothing bound. Variadic arguments are never
    /// missing.
    pub fn missing<'a>(&self, specs: &'a [ArgSpec]) -> Vec<&'a ArgSpec> {
        specs
            .iter()
            .filter(|s| s.required && !s.kind.is_variadic() && !self.is_bound(&s.name))
            .collect()
    }

    pub fn ensure_complete(&self, specs: &[ArgSpec]) -> ParseResult<()> {
        let names: Vec<String> = self.missing(specs).iter().map(|s| s.name.clone()).collect();
        if names.is_empty() {
            Ok(())
        } else {
            Err(ParseError::MissingArguments { names })
        }
    }

    pub fn has_leftover(&self) -> bool {
        !self.leftover.is_empty()
    }

    pub fn into_leftover(self) -> Vec<String> {
        self.leftover
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_prefers_keywords_then_last_positional() {
        let file = ArgSpec::positional("file");
        let rest = ArgSpec::variadic("rest");
        let out = ParseOutcome {
            positionals: vec![
                Binding { spec: &file, value: "a".into() },
                Binding { spec: &rest, value: "b".into() },
                Binding { spec: &rest, value: "c".into() },
            ],
            ..Default::default()
        };
        assert_eq!(out.get("file"), Some(&ParsedValue::from("a")));
        assert_eq!(out.get("rest"), Some(&ParsedValue::from("c")));
        let all: Vec<&ParsedValue> = out.values_of("rest").collect();
        assert_eq!(all.len(), 2);
        assert_eq!(out.get("nope"), None);
    }

    #[test]
    fn missing_reports_unbound_required_args() {
        let specs = vec![
            ArgSpec::positional("ifile").required(true),
            ArgSpec::positional("ofile"),
            ArgSpec::keyword("rot").default_value(13i64).required(true),
            ArgSpec::variadic("rest").required(true),
        ];
        let out = ParseOutcome::default();
        let names: Vec<&str> = out.missing(&specs).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ifile", "rot"]);

        match out.ensure_complete(&specs) {
            Err(ParseError::MissingArguments { names }) => assert_eq!(names, vec!["ifile", "rot"]),
            other => panic!("expected MissingArguments, got: {other:?}"),
        }

        assert_eq!(out.value_or_default(&specs[2]), Some(&ParsedValue::from(13i64)));
        assert_eq!(out.value_or_default(&specs[1]), None);
    }

    #[test]
    fn serializes_bindings_by_name() {
        let rot = ArgSpec::keyword("rot");
        let mut out = ParseOutcome::default();
        out.keywords.insert(
            "rot".to_string(),
            Binding { spec: &rot, value: 5i64.into() },
        );
        out.leftover.push("-x".to_string());
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(
            json,
            r#"{"positionals":[],"keywords":{"rot":{"name":"rot","value":5}},"leftover":["-x"]}"#
        );
    }
}
