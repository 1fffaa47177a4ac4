//! Error and diagnostic system for K_Spk expressions.
//!
//! This module provides:
//! - Typed diagnostic kinds per pipeline phase ([`LexError`], [`SyntaxError`],
//!   [`CompositionWarning`])
//! - Error codes for documentation and searchability
//! - Labeled spans, severity levels and a recovery flag
//! - A collector that accumulates diagnostics in emission order
//!
//! # Overview
//!
//! Expression-level problems never abort processing. Each one becomes a
//! [`Diagnostic`] attached to the parse result, and consumers decide whether
//! a degraded result is acceptable by inspecting [`Diagnostic::is_recovered`].
//! A [`ParseError`] only appears when a caller asks for a strict result.
//!
//! # Example
//!
//! ```
//! # use kspk_parser::error::{Diagnostic, ErrorCode, SyntaxError};
//! # use kspk_parser::Span;
//! let diag = Diagnostic::error(
//!     SyntaxError::MissingOperand { position: 0, expected_arity: 2 },
//!     "binary operator `⊕` is missing its left operand",
//! )
//! .with_label(Span::new(0..3), "expects two operands")
//! .recovered();
//!
//! assert_eq!(diag.code(), ErrorCode::E100);
//! assert!(diag.is_recovered());
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod kind;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use kind::{CompositionWarning, DiagnosticKind, LexError, SyntaxError};
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
