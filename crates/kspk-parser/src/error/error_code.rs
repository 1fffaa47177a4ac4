//! Error codes for the K_Spk diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Compositor warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unknown symbol.
    ///
    /// A codepoint matches no symbol in the table and is not inside literal
    /// group text.
    E001,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Missing operand.
    ///
    /// An operator has fewer operands than its arity requires.
    E100,

    /// Ambiguous precedence.
    ///
    /// Two operators of equal precedence meet and at least one of them is
    /// non-associative.
    E101,

    /// Unmatched group close.
    E102,

    /// Unterminated group.
    ///
    /// A group was opened but never closed before its enclosing scope ended.
    E103,

    /// Nesting too deep.
    ///
    /// Operators or groups are nested beyond the parser's depth limit.
    E104,

    // =========================================================================
    // Compositor Warnings (E2xx)
    // =========================================================================
    /// Emotional conflict.
    ///
    /// Sibling operands carry opposite-signed emotional valence.
    E200,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unknown symbol",
            ErrorCode::E100 => "missing operand",
            ErrorCode::E101 => "ambiguous precedence",
            ErrorCode::E102 => "unmatched group close",
            ErrorCode::E103 => "unterminated group",
            ErrorCode::E104 => "nesting too deep",
            ErrorCode::E200 => "emotional conflict",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
