//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the expression source.
///
/// - **Primary labels** mark the location of the problem itself.
/// - **Secondary labels** point at related context, such as the group open
///   that a missing close belongs to.
///
/// ```text
/// error[E103]: group `⟨` is never closed
///   |
/// 1 | ⬢♦⟨⬢⊕⬢
///   |   - opened here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// A label marking the problem itself.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// A label pointing at related context.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// The labeled byte range.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Text shown next to the span.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` for a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Returns `true` for a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(3..6), "unknown here");

        assert_eq!(label.span(), Span::new(3..6));
        assert_eq!(label.message(), "unknown here");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(0..3), "group opened here");

        assert!(label.is_secondary());
    }
}
