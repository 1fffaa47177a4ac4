//! Emotional content: a blended valence/arousal/dominance vector.

use std::{fmt, ops::Add};

use kspk_core::{Affect, Dimension};
use kspk_parser::{
    Diagnostic,
    error::{CompositionWarning, DiagnosticCollector},
};

use crate::compose::{NodeContext, Role};

use super::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionVector {
    pub valence: f64,
    pub arousal: f64,
    pub dominance: f64,
}

impl EmotionVector {
    pub fn new(valence: f64, arousal: f64, dominance: f64) -> Self {
        Self {
            valence,
            arousal,
            dominance,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.valence == 0.0 && self.arousal == 0.0 && self.dominance == 0.0
    }

    fn scaled(self, factor: f64) -> Self {
        Self::new(
            self.valence * factor,
            self.arousal * factor,
            self.dominance * factor,
        )
    }
}

impl Add for EmotionVector {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.valence + other.valence,
            self.arousal + other.arousal,
            self.dominance + other.dominance,
        )
    }
}

impl From<Affect> for EmotionVector {
    fn from(affect: Affect) -> Self {
        Self::new(affect.valence, affect.arousal, affect.dominance)
    }
}

impl fmt::Display for EmotionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "valence {:.3}, arousal {:.3}, dominance {:.3}",
            self.valence, self.arousal, self.dominance
        )
    }
}

/// Builds [`EmotionVector`] content and reports conflicting siblings.
pub(crate) struct EmotionalLayer {
    /// Valence magnitude at or below which a contribution is neutral.
    threshold: f64,
    diagnostics: DiagnosticCollector,
}

impl EmotionalLayer {
    pub(crate) fn new(threshold: f64) -> Self {
        Self {
            threshold,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_diagnostics()
    }

    fn own(node: &NodeContext<'_>) -> EmotionVector {
        match (node.role(), node.definition()) {
            (Role::Literal, _) | (_, None) => EmotionVector::default(),
            (_, Some(definition)) => definition.affect().into(),
        }
    }

    fn report_conflict(&mut self, node: &NodeContext<'_>, children: &[EmotionVector]) {
        let positive = children.iter().any(|c| c.valence > self.threshold);
        let negative = children.iter().any(|c| c.valence < -self.threshold);
        if !(positive && negative) {
            return;
        }

        let span = node.node().span();
        self.diagnostics.emit(
            Diagnostic::warning(
                CompositionWarning::EmotionalConflict {
                    position: span.start(),
                },
                "operands carry opposite emotional valence",
            )
            .with_label(span, "blended here")
            .with_help("the blended value is kept; review whether the mixed affect is intended")
            .recovered(),
        );
    }
}

impl Layer for EmotionalLayer {
    type Content = EmotionVector;

    fn dimension(&self) -> Dimension {
        Dimension::Emotional
    }

    fn combine(&mut self, node: &NodeContext<'_>, children: Vec<EmotionVector>) -> EmotionVector {
        self.report_conflict(node, &children);

        let weight = node.weight(Dimension::Emotional);
        let factor = if weight == 0.0 { 1.0 } else { weight.abs() };

        children
            .into_iter()
            .map(|child| child.scaled(factor))
            .fold(Self::own(node), Add::add)
    }

    fn contributes(&self, node: &NodeContext<'_>) -> bool {
        !Self::own(node).is_zero()
    }
}
