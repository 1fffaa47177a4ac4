//! The five content dimensions every K_Spk message carries.
//!
//! A symbol contributes to each [`Dimension`] through a signed weight. The
//! weights of one symbol are grouped in [`LayerWeights`], which is indexable by
//! dimension so that parser and compositor code never switches on a symbol's
//! identity.
//!
//! # Example
//!
//! ```
//! # use kspk_core::dimension::{Dimension, LayerWeights};
//! let weights = LayerWeights::zero()
//!     .with(Dimension::Semantic, 1.0)
//!     .with(Dimension::Logical, 0.5);
//!
//! assert_eq!(weights[Dimension::Semantic], 1.0);
//! assert_eq!(weights[Dimension::Temporal], 0.0);
//! assert!(!weights.is_zero());
//! ```

use std::{fmt, ops::Index, str::FromStr};

use serde::Deserialize;

/// One of the five independent content channels of a message.
///
/// The declaration order is the canonical order used everywhere a
/// per-dimension list is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Core meaning and symbolic interpretation.
    Semantic,
    /// Timing and sequence.
    Temporal,
    /// Position, dimension and shape.
    Spatial,
    /// Operations and conditions.
    Logical,
    /// Affect and intent.
    Emotional,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Semantic,
        Dimension::Temporal,
        Dimension::Spatial,
        Dimension::Logical,
        Dimension::Emotional,
    ];

    /// Position of this dimension in [`Dimension::ALL`].
    pub fn index(self) -> usize {
        match self {
            Dimension::Semantic => 0,
            Dimension::Temporal => 1,
            Dimension::Spatial => 2,
            Dimension::Logical => 3,
            Dimension::Emotional => 4,
        }
    }

    /// Lowercase name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Semantic => "semantic",
            Dimension::Temporal => "temporal",
            Dimension::Spatial => "spatial",
            Dimension::Logical => "logical",
            Dimension::Emotional => "emotional",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|dimension| dimension.name() == s)
            .ok_or_else(|| format!("unknown dimension `{s}`"))
    }
}

/// Signed per-dimension contributions of a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerWeights([f64; 5]);

impl LayerWeights {
    /// Weights that contribute nothing to any dimension.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build weights from values in [`Dimension::ALL`] order.
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    /// Return a copy with `dimension` set to `value`.
    pub fn with(mut self, dimension: Dimension, value: f64) -> Self {
        self.0[dimension.index()] = value;
        self
    }

    /// Weight for `dimension`.
    pub fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension.index()]
    }

    /// Returns `true` when every weight is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|w| *w == 0.0)
    }

    /// Returns `true` when every weight is a finite number.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|w| w.is_finite())
    }

    /// Iterate `(dimension, weight)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

impl Index<Dimension> for LayerWeights {
    type Output = f64;

    fn index(&self, dimension: Dimension) -> &Self::Output {
        &self.0[dimension.index()]
    }
}

/// An explicit emotional profile declared by a symbol.
///
/// When a symbol does not declare one, the compositor derives a profile from
/// the symbol's emotional weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Affect {
    pub valence: f64,
    pub arousal: f64,
    pub dominance: f64,
}

impl Affect {
    pub fn new(valence: f64, arousal: f64, dominance: f64) -> Self {
        Self {
            valence,
            arousal,
            dominance,
        }
    }

    /// Profile implied by a bare emotional weight: the sign carries valence and
    /// the magnitude carries arousal.
    pub fn from_weight(weight: f64) -> Self {
        Self::new(weight, weight.abs(), 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.valence.is_finite() && self.arousal.is_finite() && self.dominance.is_finite()
    }
}
