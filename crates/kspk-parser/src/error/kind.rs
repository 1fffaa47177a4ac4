//! Typed diagnostic kinds, one enum per pipeline phase.

use thiserror::Error;

use crate::error::ErrorCode;

/// Problems found while scanning the expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown symbol `{symbol}` at byte {position}")]
    UnknownSymbol { position: usize, symbol: char },
}

/// Problems found while structuring tokens into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("missing operand at byte {position}: expected {expected_arity}")]
    MissingOperand { position: usize, expected_arity: u8 },

    #[error("ambiguous precedence at byte {position}")]
    AmbiguousPrecedence { position: usize },

    #[error("unmatched group close at byte {position}")]
    UnmatchedClose { position: usize },

    #[error("unterminated group at byte {position}")]
    UnterminatedGroup { position: usize },

    #[error("nesting deeper than {limit} levels at byte {position}")]
    NestingTooDeep { position: usize, limit: usize },
}

/// Anomalies found while compositing layer content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionWarning {
    #[error("conflicting emotional contributions at byte {position}")]
    EmotionalConflict { position: usize },
}

/// Any diagnostic kind, tagged by phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Composition(#[from] CompositionWarning),
}

impl DiagnosticKind {
    /// Byte offset in the source where the problem was detected.
    pub fn position(&self) -> usize {
        match self {
            DiagnosticKind::Lex(LexError::UnknownSymbol { position, .. })
            | DiagnosticKind::Syntax(
                SyntaxError::MissingOperand { position, .. }
                | SyntaxError::AmbiguousPrecedence { position }
                | SyntaxError::UnmatchedClose { position }
                | SyntaxError::UnterminatedGroup { position }
                | SyntaxError::NestingTooDeep { position, .. },
            )
            | DiagnosticKind::Composition(CompositionWarning::EmotionalConflict { position }) => {
                *position
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DiagnosticKind::Lex(LexError::UnknownSymbol { .. }) => ErrorCode::E001,
            DiagnosticKind::Syntax(SyntaxError::MissingOperand { .. }) => ErrorCode::E100,
            DiagnosticKind::Syntax(SyntaxError::AmbiguousPrecedence { .. }) => ErrorCode::E101,
            DiagnosticKind::Syntax(SyntaxError::UnmatchedClose { .. }) => ErrorCode::E102,
            DiagnosticKind::Syntax(SyntaxError::UnterminatedGroup { .. }) => ErrorCode::E103,
            DiagnosticKind::Syntax(SyntaxError::NestingTooDeep { .. }) => ErrorCode::E104,
            DiagnosticKind::Composition(CompositionWarning::EmotionalConflict { .. }) => {
                ErrorCode::E200
            }
        }
    }
}
