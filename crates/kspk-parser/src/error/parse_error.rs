//! The ParseError type for strict-mode rejection.
//!
//! [`ParseError`] wraps the full diagnostic list of an expression that a
//! caller refused to accept in degraded form.

use std::fmt;

use crate::error::Diagnostic;

/// An expression rejected because of unrecovered diagnostics.
#[derive(Debug, Clone)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// All diagnostics of the rejected expression, recovered ones included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The diagnostics that caused the rejection.
    pub fn unrecovered(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_recovered())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self
            .unrecovered()
            .next()
            .or_else(|| self.diagnostics.first());
        if let Some(first) = first {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxError;

    fn unmatched(position: usize) -> Diagnostic {
        Diagnostic::error(SyntaxError::UnmatchedClose { position }, "unmatched close")
            .recovered()
    }

    fn consecutive(position: usize) -> Diagnostic {
        Diagnostic::error(
            SyntaxError::MissingOperand {
                position,
                expected_arity: 2,
            },
            "consecutive binary operators",
        )
    }

    #[test]
    fn test_parse_error_display_single() {
        let err: ParseError = consecutive(3).into();
        assert_eq!(err.to_string(), "error[E100]: consecutive binary operators");
    }

    #[test]
    fn test_parse_error_display_leads_with_unrecovered() {
        let err = ParseError::new(vec![unmatched(0), consecutive(4), unmatched(9)]);

        assert_eq!(
            err.to_string(),
            "error[E100]: consecutive binary operators (+2 more)"
        );
        assert_eq!(err.unrecovered().count(), 1);
        assert_eq!(err.diagnostics().len(), 3);
    }
}
