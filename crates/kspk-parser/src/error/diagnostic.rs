//! The core diagnostic type for the K_Spk error system.
//!
//! A [`Diagnostic`] represents a single error or warning together with its
//! typed kind, labeled source spans, optional help text, and whether the
//! pipeline recovered from it.

use std::fmt;

use crate::{
    error::{DiagnosticKind, ErrorCode, Label, Severity},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// Diagnostics are accumulated during parsing and compositing and travel
/// with the result. They are never discarded.
///
/// # Example
///
/// ```text
/// error[E100]: binary operator `⊕` is missing its left operand
///   |
/// 1 | ⊕⧖♦⬢⟨analysis⟩
///   | ^ expects two operands
///   |
///   = help: place an operand before `⊕`
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    severity: Severity,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
    recovered: bool,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use kspk_parser::error::{Diagnostic, SyntaxError};
    /// # use kspk_parser::Span;
    /// let diag = Diagnostic::error(
    ///     SyntaxError::UnmatchedClose { position: 4 },
    ///     "unmatched `⟩`",
    /// )
    /// .with_label(Span::new(4..7), "no group is open here")
    /// .recovered();
    /// ```
    pub fn error(kind: impl Into<DiagnosticKind>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind.into(), message)
    }

    /// Create a warning diagnostic.
    pub fn warning(kind: impl Into<DiagnosticKind>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind.into(), message)
    }

    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Error code derived from the kind.
    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Byte offset derived from the kind.
    pub fn position(&self) -> usize {
        self.kind.position()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Returns `true` when processing continued with a sound local repair.
    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Mark this diagnostic as recovered.
    pub fn recovered(mut self) -> Self {
        self.recovered = true;
        self
    }

    fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            recovered: false,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code(), self.message)
    }
}

impl std::error::Error for Diagnostic {}
