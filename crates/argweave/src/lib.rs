//! Argv token binding with inline list and mapping literals.
//!
//! An [`ArgParser`] binds a token list against a slice of [`ArgSpec`]s and
//! returns a [`ParseOutcome`]:
//! - positional, keyword and variadic arguments, matched by name or alias
//! - values decoded by the declared scalar type (see [`DecoderRegistry`])
//! - `[a b c]` and `{k:v ...}` literals spread over one or more tokens
//!
//! Tokens that bind to nothing are kept in [`ParseOutcome::leftover`] so a
//! nested command can parse them in turn.

mod cursor;
mod literal;
mod resolve;

pub mod config;
pub mod decode;
pub mod error;
pub mod outcome;
pub mod spec;
pub mod value;

pub use config::{
    DEFAULT_MAX_DEPTH, ListDelimiters, MappingDelimiters, ParserConfig, Strictness,
};
pub use decode::{
    BoolDecoder, DecoderRegistry, FloatDecoder, IntDecoder, StrDecoder, ValueDecoder,
};
pub use error::{ParseError, ParseResult};
pub use outcome::{Binding, ParseOutcome};
pub use resolve::ArgParser;
pub use spec::{ArgKind, ArgSpec, ValueType};
pub use value::{ParsedValue, Scalar, ScalarType};
