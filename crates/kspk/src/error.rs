//! Error types for K_Spk operations.
//!
//! This module provides the main error type [`KspkError`]. Expression-level
//! problems are not errors: they travel as diagnostics on the returned
//! message. A [`KspkError`] means no message could be produced at all.

use std::io;

use thiserror::Error;

use kspk_core::ConfigError;
use kspk_parser::error::ParseError;

/// The main error type for K_Spk operations.
///
/// # Diagnostic Variants
///
/// The `Rejected` variant carries every diagnostic of the refused expression
/// together with its source text, so that callers can render labeled reports.
#[derive(Debug, Error)]
pub enum KspkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Symbol table error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{err}")]
    Rejected { err: ParseError, src: String },
}

impl KspkError {
    /// Create a new `Rejected` error with the associated source text.
    pub fn new_rejected(err: ParseError, src: impl Into<String>) -> Self {
        Self::Rejected {
            err,
            src: src.into(),
        }
    }
}
