//! Error adapter for rendering K_Spk diagnostics and errors with miette.
//!
//! This module provides the bridge between the library's plain diagnostic
//! types and miette's graphical reports used in the CLI. Every diagnostic is
//! rendered as its own report, whether it arrived on a message or inside a
//! strict-mode rejection.

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, Severity as MietteSeverity,
    SourceSpan,
};

use kspk::KspkError;
use kspk_parser::{
    Diagnostic, Span,
    error::{ErrorCode, Severity},
};

/// Adapter for a single K_Spk diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Expression source for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(CodeDisplay(self.diag.code())))
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Diagnostic code in the CLI's `kspk::` namespace, e.g. `kspk::E100`.
struct CodeDisplay(ErrorCode);

impl fmt::Display for CodeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kspk::{}", self.0)
    }
}

/// Adapter for [`KspkError`] variants without source locations.
pub struct ErrorAdapter<'a>(pub &'a KspkError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            KspkError::Io(_) => "kspk::io",
            KspkError::Config(_) => "kspk::table",
            KspkError::Settings(_) => "kspk::config",
            KspkError::Rejected { .. } => return None,
        };
        Some(Box::new(code))
    }
}

/// A reportable problem that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A fatal error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Wrap each diagnostic of an expression for rendering.
pub fn diagnostic_reportables<'a>(
    diagnostics: &'a [Diagnostic],
    src: &'a str,
) -> Vec<Reportable<'a>> {
    diagnostics
        .iter()
        .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
        .collect()
}

/// Convert a [`KspkError`] into a list of reportable errors.
///
/// A strict-mode rejection yields one [`Reportable`] per diagnostic of the
/// refused expression; every other variant yields a single one.
pub fn to_reportables(err: &KspkError) -> Vec<Reportable<'_>> {
    match err {
        KspkError::Rejected { err, src } => diagnostic_reportables(err.diagnostics(), src),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// Render one report with miette's graphical handler.
pub fn render(reportable: &Reportable<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = GraphicalReportHandler::new().render_report(&mut out, reportable);
    out
}

#[cfg(test)]
mod tests {
    use kspk_parser::error::{CompositionWarning, ParseError, SyntaxError};

    use super::*;

    fn missing_operand() -> Diagnostic {
        Diagnostic::error(
            SyntaxError::MissingOperand {
                position: 3,
                expected_arity: 2,
            },
            "binary operator is missing its right operand",
        )
        .with_label(Span::new(3..6), "expects two operands")
        .with_help("add an operand after the operator")
    }

    #[test]
    fn test_rejection_is_split_per_diagnostic() {
        let diags = vec![
            missing_operand(),
            Diagnostic::error(
                SyntaxError::UnmatchedClose { position: 0 },
                "unmatched closing delimiter",
            )
            .with_label(Span::new(0..1), "no group open"),
        ];
        let err = KspkError::new_rejected(ParseError::from(diags), ")⬢♦");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(
            reportables[0].to_string(),
            "binary operator is missing its right operand"
        );
        assert_eq!(reportables[1].to_string(), "unmatched closing delimiter");
    }

    #[test]
    fn test_non_diagnostic_error() {
        let err = KspkError::Settings("bad value".to_string());

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Settings error: bad value");
                assert_eq!(e.code().unwrap().to_string(), "kspk::config");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_code_and_severity() {
        let diag = missing_operand();
        let adapter = DiagnosticAdapter::new(&diag, "⬢♦");
        assert_eq!(adapter.code().unwrap().to_string(), "kspk::E100");
        assert_eq!(adapter.severity(), Some(MietteSeverity::Error));

        let warning = Diagnostic::warning(
            CompositionWarning::EmotionalConflict { position: 0 },
            "operands carry opposite emotional valence",
        );
        let adapter = DiagnosticAdapter::new(&warning, "⬢");
        assert_eq!(adapter.code().unwrap().to_string(), "kspk::E200");
        assert_eq!(adapter.severity(), Some(MietteSeverity::Warning));
        assert!(adapter.labels().is_none());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = missing_operand().with_secondary_label(Span::new(0..3), "left operand");
        let adapter = DiagnosticAdapter::new(&diag, "⬢♦");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("expects two operands"));
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_render_includes_code_and_help() {
        let diag = missing_operand();
        let rendered = render(&Reportable::Diagnostic(DiagnosticAdapter::new(&diag, "⬢♦")));

        assert!(rendered.contains("E100"));
        assert!(rendered.contains("add an operand"));
    }
}
