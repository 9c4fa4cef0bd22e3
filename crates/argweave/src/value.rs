//! Values produced by a parse call.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar type tag understood by the decoder registry.
///
/// `Any` is the supertype of every other tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Any,
    Str,
    Int,
    Float,
    Bool,
}

impl ScalarType {
    /// Whether a decoder declared for `self` may decode values of `other`.
    pub fn is_supertype_of(self, other: ScalarType) -> bool {
        self == other || self == ScalarType::Any
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded scalar.
///
/// Variant order matters for untagged deserialization: JSON `true` must not
/// become a string, and `5` must stay an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Bool(_) => ScalarType::Bool,
            Self::Int(_) => ScalarType::Int,
            Self::Float(_) => ScalarType::Float,
            Self::Str(_) => ScalarType::Str,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A parsed argument value: a scalar or a (possibly nested) composite literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Scalar(Scalar),
    Sequence(Vec<ParsedValue>),
    Mapping(IndexMap<String, ParsedValue>),
}

impl ParsedValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Float view; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Scalar(Scalar::Float(x)) => Some(*x),
            Self::Scalar(Scalar::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParsedValue]> {
        match self {
            Self::Sequence(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ParsedValue>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Scalar> for ParsedValue {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<bool> for ParsedValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for ParsedValue {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for ParsedValue {
    fn from(x: f64) -> Self {
        Self::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for ParsedValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for ParsedValue {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Str(s))
    }
}

impl<T: Into<ParsedValue>> From<Vec<T>> for ParsedValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_supertype_of_everything() {
        for t in [
            ScalarType::Str,
            ScalarType::Int,
            ScalarType::Float,
            ScalarType::Bool,
        ] {
            assert!(ScalarType::Any.is_supertype_of(t));
            assert!(t.is_supertype_of(t));
        }
        assert!(!ScalarType::Float.is_supertype_of(ScalarType::Int));
    }

    #[test]
    fn json_shape_is_natural() {
        let mut m = IndexMap::new();
        m.insert("b".to_string(), ParsedValue::from(vec![1i64, 2]));
        m.insert("a".to_string(), ParsedValue::from("x"));
        let v = ParsedValue::Mapping(m);

        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"b":[1,2],"a":"x"}"#);

        let back: ParsedValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn untagged_scalars_keep_their_type() {
        let v: ParsedValue = serde_json::from_str("[true, 5, 2.5, \"s\"]").unwrap();
        let items = v.as_sequence().unwrap();
        assert_eq!(items[0].as_bool(), Some(true));
        assert_eq!(items[1].as_int(), Some(5));
        assert_eq!(items[2].as_float(), Some(2.5));
        assert_eq!(items[3].as_str(), Some("s"));
    }
}
