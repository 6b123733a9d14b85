//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Integer variable could not be parsed.
    #[error("failed to parse {name}='{value}' as an integer: {source}")]
    InvalidInteger {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Float variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number: {source}")]
    InvalidFloat {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Boolean variable was not one of `true/false/1/0/yes/no/on/off`.
    #[error("invalid boolean {name}='{value}'")]
    InvalidBool { name: &'static str, value: String },

    /// Reranker kind is not a registered strategy.
    #[error("unknown reranker '{value}': expected 'optimized_crossencoder' or 'fast_biencoder'")]
    UnknownReranker { value: String },

    /// Parsed value is out of range.
    #[error("invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
