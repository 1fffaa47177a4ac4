//! Collector for accumulating diagnostics across pipeline phases.

use log::warn;

use crate::error::Diagnostic;

/// Accumulates diagnostics in emission order.
///
/// Phases report every problem they find instead of stopping at the first
/// one; the collected list is handed to the caller with the result.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        warn!(
            code = diagnostic.code().as_str(),
            position = diagnostic.position(),
            recovered = diagnostic.is_recovered();
            "{}", diagnostic.message()
        );
        self.diagnostics.push(diagnostic);
    }

    /// Record several diagnostics, preserving their order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `true` when any recorded diagnostic was not recovered.
    pub fn has_unrecovered(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_recovered())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LexError, SyntaxError};

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut collector = DiagnosticCollector::new();
        assert!(collector.is_empty());

        collector.emit(Diagnostic::error(
            SyntaxError::UnmatchedClose { position: 5 },
            "second in source",
        ));
        collector.emit(Diagnostic::error(
            LexError::UnknownSymbol {
                position: 1,
                symbol: '?',
            },
            "first in source",
        ));

        let messages: Vec<_> = collector
            .diagnostics()
            .iter()
            .map(|d| d.message())
            .collect();
        assert_eq!(messages, ["second in source", "first in source"]);
    }

    #[test]
    fn test_collector_tracks_unrecovered() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error(SyntaxError::UnmatchedClose { position: 0 }, "stray").recovered(),
        );
        assert!(!collector.has_unrecovered());

        collector.emit(Diagnostic::error(
            SyntaxError::MissingOperand {
                position: 2,
                expected_arity: 2,
            },
            "consecutive operators",
        ));
        assert!(collector.has_unrecovered());
        assert_eq!(collector.len(), 2);
    }
}
