//! K_Spk - Multi-modal messages from symbol expressions.
//!
//! Parsing and layer compositing for the K_Spk agent protocol. An expression
//! of table-defined symbols is parsed into a syntax tree, and the tree is
//! composited into five synchronized layers of content: semantic, temporal,
//! spatial, logical and emotional.

pub mod config;
pub mod layer;

mod compose;
mod error;
mod message;

pub use kspk_core::{Dimension, SymbolTable};
pub use kspk_parser::{Diagnostic, ParsedExpression};

pub use error::KspkError;
pub use message::{MultiModalMessage, Provenance};

use std::{fs, path::Path, sync::Arc};

use log::{debug, info, trace};

use compose::Compositor;
use config::AppConfig;

/// Builder for parsing and compositing K_Spk expressions.
///
/// A builder holds an immutable, shared symbol table and can be used from any
/// number of threads at once; every call is independent of the others.
///
/// # Examples
///
/// ```
/// use kspk::{MessageBuilder, config::AppConfig};
///
/// let builder = MessageBuilder::builtin(AppConfig::default())
///     .expect("built-in table is valid");
///
/// let message = builder.process("⬢♦⬢").expect("not strict");
/// assert!(message.diagnostics().is_empty());
/// assert!(message.emotional().valence > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    config: AppConfig,
    table: Arc<SymbolTable>,
}

impl MessageBuilder {
    /// Create a builder over an already loaded table.
    ///
    /// # Arguments
    ///
    /// * `config` - Compositor and parser settings; the `[symbols]` section is
    ///   not consulted
    /// * `table` - The validated symbol table, possibly shared with other builders
    pub fn new(config: AppConfig, table: Arc<SymbolTable>) -> Self {
        Self { config, table }
    }

    /// Create a builder over the built-in symbol table.
    ///
    /// # Errors
    ///
    /// Returns `KspkError::Config` if the built-in table fails validation.
    pub fn builtin(config: AppConfig) -> Result<Self, KspkError> {
        let table = SymbolTable::builtin()?;
        Ok(Self::new(config, Arc::new(table)))
    }

    /// Create a builder over the table named in `config`, or the built-in
    /// table when none is configured.
    ///
    /// # Errors
    ///
    /// Returns `KspkError::Io` if the table file cannot be read and
    /// `KspkError::Config` if it is not a valid table.
    pub fn from_config(config: AppConfig) -> Result<Self, KspkError> {
        match config.symbols().table() {
            Some(path) => {
                let table = load_table(path)?;
                Ok(Self::new(config, Arc::new(table)))
            }
            None => Self::builtin(config),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Parse an expression into a syntax tree with diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `KspkError::Rejected` in strict mode when any diagnostic is
    /// unrecovered. Otherwise parsing always succeeds.
    pub fn parse(&self, source: &str) -> Result<ParsedExpression, KspkError> {
        info!(bytes = source.len(); "Parsing expression");

        let parsed = kspk_parser::parse(source, &self.table);
        if !self.config.parser().strict() {
            return Ok(parsed);
        }

        parsed
            .into_result()
            .map_err(|err| KspkError::new_rejected(err, source))
    }

    /// Composite a parsed expression into a message.
    ///
    /// Compositing never fails; conflicts are reported as warnings on the
    /// returned message.
    pub fn compose(&self, parsed: ParsedExpression) -> MultiModalMessage {
        let (ast, diagnostics) = parsed.into_parts();
        let composition = Compositor::new(&self.table, self.config.compositor()).compose(&ast);
        let message = MultiModalMessage::new(ast, diagnostics, composition);

        debug!(
            diagnostics = message.diagnostics().len(),
            degraded = message.is_degraded();
            "Message composited"
        );
        trace!("Message:\n{}", message.summary(&self.table));
        message
    }

    /// Parse and composite an expression.
    ///
    /// # Errors
    ///
    /// Returns `KspkError::Rejected` in strict mode when any diagnostic is
    /// unrecovered.
    pub fn process(&self, source: &str) -> Result<MultiModalMessage, KspkError> {
        let parsed = self.parse(source)?;
        let message = self.compose(parsed);
        info!(
            diagnostics = message.diagnostics().len();
            "Expression processed"
        );
        Ok(message)
    }
}

/// Read and validate a TOML symbol table.
///
/// # Errors
///
/// Returns `KspkError::Io` if the file cannot be read and `KspkError::Config`
/// if its content is not a valid table.
pub fn load_table(path: &Path) -> Result<SymbolTable, KspkError> {
    let text = fs::read_to_string(path)?;
    let table = SymbolTable::from_toml_str(&text)?;
    info!(path:? = path, symbols = table.len(); "Symbol table loaded");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_builder_is_shareable() {
        assert_send_sync::<MessageBuilder>();
        assert_send_sync::<MultiModalMessage>();
    }

    #[test]
    fn test_parallel_processing_matches_sequential() {
        let builder = Arc::new(MessageBuilder::builtin(AppConfig::default()).unwrap());
        let sources = ["⬢♦⬢", "⊕⧖♦⬢⟨analysis⟩", "⧖⬢✧ → ⬢⊗⬢", "⟨⬢ ⊕ ⟨note⟩⟩ ∧ ⬢"];

        let expected: Vec<_> = sources
            .iter()
            .map(|source| builder.process(source).unwrap().summary(builder.table()))
            .collect();

        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let builder = Arc::clone(&builder);
                let source = source.to_string();
                thread::spawn(move || builder.process(&source).unwrap().summary(builder.table()))
            })
            .collect();

        for (handle, expected) in handles.into_iter().zip(expected) {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_strict_mode_rejects_unrecovered() {
        let builder = MessageBuilder::builtin(AppConfig::default().with_strict(true)).unwrap();

        let err = builder.process("⬢♦⊕⬢").unwrap_err();
        let KspkError::Rejected { err, src } = err else {
            panic!("expected a rejection");
        };
        assert_eq!(src, "⬢♦⊕⬢");
        assert_eq!(err.unrecovered().count(), 1);

        // Recovered problems are still accepted.
        let message = builder.process("⬢♦").unwrap();
        assert_eq!(message.diagnostics().len(), 1);
    }

    #[test]
    fn test_lenient_mode_keeps_partial_tree() {
        let builder = MessageBuilder::builtin(AppConfig::default()).unwrap();
        let message = builder.process("⬢♦⊕⬢").unwrap();

        assert!(message.has_unrecovered());
        assert!(message.ast()[message.root()].is_leaf());
    }

    #[test]
    fn test_from_config_reports_missing_table() {
        let config = AppConfig::default().with_table("/nonexistent/kspk/table.toml");
        let err = MessageBuilder::from_config(config).unwrap_err();
        assert!(matches!(err, KspkError::Io(_)));
    }
}
