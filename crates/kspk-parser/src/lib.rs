//! # K_Spk Parser
//!
//! Lexer and precedence parser for K_Spk symbol expressions. This crate turns
//! an expression string into an arena-allocated [`Ast`] plus the list of
//! [`Diagnostic`]s found along the way.
//!
//! Parsing never fails: malformed input is repaired locally where possible,
//! skipped otherwise, and always yields a tree. Callers that refuse degraded
//! results use [`ParsedExpression::into_result`].
//!
//! ## Usage
//!
//! ```
//! # use kspk_core::SymbolTable;
//! # use kspk_parser::{parse, ast::NodeKind};
//! let table = SymbolTable::builtin().unwrap();
//! let parsed = parse("⬢♦⬢", &table);
//!
//! assert!(parsed.diagnostics().is_empty());
//! assert!(matches!(
//!     parsed.ast().node(parsed.ast().root()).kind(),
//!     NodeKind::Binary { .. }
//! ));
//! ```

pub mod ast;
pub mod error;
pub mod printer;

mod lexer;
mod parser;
mod span;
mod tokens;

pub use ast::{Ast, NodeId};
pub use error::{Diagnostic, ParseError};
pub use span::{Span, Spanned};

use kspk_core::SymbolTable;
use log::{debug, trace};

/// The result of parsing one expression.
#[derive(Debug, Clone)]
pub struct ParsedExpression {
    ast: Ast,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedExpression {
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Diagnostics ordered by source position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` when parsing found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `true` when some diagnostic could not be recovered from.
    pub fn has_unrecovered(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_recovered())
    }

    /// Reject the expression if any diagnostic is unrecovered.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] carrying every diagnostic of the expression.
    pub fn into_result(self) -> Result<Self, ParseError> {
        if self.has_unrecovered() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self)
        }
    }

    pub fn into_parts(self) -> (Ast, Vec<Diagnostic>) {
        (self.ast, self.diagnostics)
    }
}

/// Parse an expression against a symbol table.
///
/// This is the main entry point of the crate. It runs the two phases:
///
/// 1. **Tokenize** - Resolve symbol keys and capture literal group text
/// 2. **Parse** - Build the tree by precedence climbing, with recovery
pub fn parse(source: &str, table: &SymbolTable) -> ParsedExpression {
    let (tokens, diagnostics) = lexer::tokenize(source, table);
    let (ast, diagnostics) = parser::build_ast(&tokens, table, diagnostics, source.len());

    debug!(
        nodes = ast.len(),
        diagnostics = diagnostics.len(),
        unrecovered = diagnostics.has_unrecovered();
        "Parsed expression"
    );
    trace!("Syntax tree:\n{}", printer::tree(&ast, table));

    let mut diagnostics = diagnostics.into_diagnostics();
    diagnostics.sort_by_key(Diagnostic::position);

    ParsedExpression { ast, diagnostics }
}
