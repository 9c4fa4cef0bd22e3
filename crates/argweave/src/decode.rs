//! Scalar decoder registry.
//!
//! A decoder turns exactly one token into one [`Scalar`]. Composite literals
//! are handled a layer up, in [`crate::literal`].

use std::fmt;
use std::sync::Arc;

use crate::error::{ParseError, ParseResult};
use crate::spec::ArgSpec;
use crate::value::{Scalar, ScalarType};

/// Converts one token to a typed scalar.
pub trait ValueDecoder: fmt::Debug + Send + Sync {
    /// The scalar type this decoder produces.
    fn value_type(&self) -> ScalarType;

    fn decode(&self, token: &str) -> ParseResult<Scalar>;
}

fn decode_error(token: &str, expected: ScalarType) -> ParseError {
    ParseError::ValueDecode {
        token: token.to_string(),
        expected,
    }
}

/// Passes the token through as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrDecoder;

impl ValueDecoder for StrDecoder {
    fn value_type(&self) -> ScalarType {
        ScalarType::Str
    }

    fn decode(&self, token: &str) -> ParseResult<Scalar> {
        Ok(Scalar::Str(token.to_string()))
    }
}

/// Base-10 integers, plus `0x`/`0o`/`0b` prefixed hex/octal/binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntDecoder;

impl ValueDecoder for IntDecoder {
    fn value_type(&self) -> ScalarType {
        ScalarType::Int
    }

    fn decode(&self, token: &str) -> ParseResult<Scalar> {
        let (negative, unsigned) = match token.as_bytes().first() {
            Some(b'-') => (true, &token[1..]),
            Some(b'+') => (false, &token[1..]),
            _ => (false, token),
        };

        let (radix, digits) = match unsigned.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => (16, &unsigned[2..]),
            Some("0o") => (8, &unsigned[2..]),
            Some("0b") => (2, &unsigned[2..]),
            _ => (10, unsigned),
        };

        // from_str_radix would accept a second sign here.
        if digits.is_empty() || digits.starts_with(['+', '-']) {
            return Err(decode_error(token, ScalarType::Int));
        }

        let magnitude =
            i128::from_str_radix(digits, radix).map_err(|_| decode_error(token, ScalarType::Int))?;
        let value = if negative { -magnitude } else { magnitude };
        i64::try_from(value)
            .map(Scalar::Int)
            .map_err(|_| decode_error(token, ScalarType::Int))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatDecoder;

impl ValueDecoder for FloatDecoder {
    fn value_type(&self) -> ScalarType {
        ScalarType::Float
    }

    fn decode(&self, token: &str) -> ParseResult<Scalar> {
        token
            .trim()
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|_| decode_error(token, ScalarType::Float))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolDecoder;

impl ValueDecoder for BoolDecoder {
    fn value_type(&self) -> ScalarType {
        ScalarType::Bool
    }

    fn decode(&self, token: &str) -> ParseResult<Scalar> {
        match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Scalar::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Scalar::Bool(false)),
            _ => Err(decode_error(token, ScalarType::Bool)),
        }
    }
}

/// Ordered set of decoders with a string passthrough fallback.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn ValueDecoder>>,
    fallback: Arc<dyn ValueDecoder>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::empty()
            .register(IntDecoder)
            .register(FloatDecoder)
            .register(BoolDecoder)
    }
}

impl DecoderRegistry {
    /// Registry holding only the string passthrough fallback.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
            fallback: Arc::new(StrDecoder),
        }
    }

    /// Append a decoder. Earlier registrations win on ties.
    pub fn register(mut self, decoder: impl ValueDecoder + 'static) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    pub fn decoders(&self) -> impl Iterator<Item = &dyn ValueDecoder> {
        self.decoders.iter().map(|d| &**d)
    }

    /// Select the decoder for `spec`.
    ///
    /// Absent or untyped specs use the passthrough decoder, as does a typed spec
    /// that no registered decoder covers.
    pub fn resolve(&self, spec: Option<&ArgSpec>) -> ParseResult<&dyn ValueDecoder> {
        let Some(spec) = spec else {
            return Ok(&*self.fallback);
        };
        let wanted = spec.value_type.scalar_type(&spec.name)?;
        if wanted == ScalarType::Any {
            return Ok(&*self.fallback);
        }
        Ok(self
            .decoders
            .iter()
            .find(|d| d.value_type().is_supertype_of(wanted))
            .map(|d| &**d)
            .unwrap_or(&*self.fallback))
    }

    pub fn passthrough(&self) -> &dyn ValueDecoder {
        &*self.fallback
    }
}
