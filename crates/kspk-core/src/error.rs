//! Errors raised while loading or validating a symbol table.
//!
//! A malformed table is the only fatal condition in the pipeline: it is
//! reported once, at the load boundary, before any expression is processed.

use thiserror::Error;

use crate::symbol::Category;

/// A symbol table that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("symbol key must not be empty")]
    EmptyKey,

    #[error("symbol key `{key}` must not contain whitespace")]
    WhitespaceInKey { key: String },

    #[error("symbol `{key}` is defined more than once")]
    DuplicateSymbol { key: String },

    #[error("symbol `{key}` is a {category} and must have arity {expected}, found {declared}")]
    ArityMismatch {
        key: String,
        category: Category,
        declared: u8,
        expected: u8,
    },

    #[error("group open `{key}` does not declare a closing symbol")]
    MissingCloser { key: String },

    #[error("group open `{key}` closes with `{closes_with}`, which is not a group close symbol")]
    UnknownCloser { key: String, closes_with: String },

    #[error("group close `{key}` has no group open counterpart")]
    UnpairedClose { key: String },

    #[error("symbol `{key}` declares a closing symbol but is not a group open")]
    UnexpectedCloser { key: String },

    #[error("delimiter `{key}` must not carry layer weights")]
    WeightedDelimiter { key: String },

    #[error("symbol `{key}` has a non-finite weight")]
    NonFiniteWeight { key: String },

    #[error("symbol `{key}` weights unknown dimension `{dimension}`")]
    UnknownDimension { key: String, dimension: String },

    #[error("failed to parse symbol table: {0}")]
    Toml(#[from] toml::de::Error),
}
