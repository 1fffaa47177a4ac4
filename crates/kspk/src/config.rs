//! Configuration types for K_Spk message processing.
//!
//! This module provides the settings that control which symbol table is used,
//! how layers are composited and how strictly expressions are accepted. All
//! types implement [`serde::Deserialize`]; every field has a default, so an
//! empty TOML document is a complete configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`SymbolsConfig`] - Location of the symbol table.
//! - [`CompositorConfig`] - Active layers and compositing constants.
//! - [`ParserConfig`] - Acceptance policy for degraded parses.
//!
//! # Example
//!
//! ```
//! # use kspk::config::AppConfig;
//! # use kspk_core::Dimension;
//! let config = AppConfig::from_toml_str(
//!     r#"
//!     [compositor]
//!     layers = ["semantic", "emotional"]
//!
//!     [parser]
//!     strict = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(config.compositor().is_active(Dimension::Emotional));
//! assert!(!config.compositor().is_active(Dimension::Temporal));
//! assert!(config.parser().strict());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use kspk_core::Dimension;

use crate::KspkError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Symbol table section.
    #[serde(default)]
    symbols: SymbolsConfig,

    /// Compositor section.
    #[serde(default)]
    compositor: CompositorConfig,

    /// Parser section.
    #[serde(default)]
    parser: ParserConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(symbols: SymbolsConfig, compositor: CompositorConfig, parser: ParserConfig) -> Self {
        Self {
            symbols,
            compositor,
            parser,
        }
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`KspkError::Settings`] if the document is not valid TOML, does
    /// not match the expected shape, or holds out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, KspkError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|err| KspkError::Settings(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the TOML shape cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`KspkError::Settings`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), KspkError> {
        self.compositor.validate().map_err(KspkError::Settings)
    }

    /// Returns the symbol table configuration.
    pub fn symbols(&self) -> &SymbolsConfig {
        &self.symbols
    }

    /// Returns the compositor configuration.
    pub fn compositor(&self) -> &CompositorConfig {
        &self.compositor
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }

    /// Return a copy that reads its symbol table from `path`.
    pub fn with_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.symbols.table = Some(path.into());
        self
    }

    /// Return a copy with strict acceptance switched on or off.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.parser.strict = strict;
        self
    }
}

/// Where the symbol table comes from.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SymbolsConfig {
    /// Path to a TOML symbol table; the built-in table when unset.
    #[serde(default)]
    table: Option<PathBuf>,
}

impl SymbolsConfig {
    pub fn new(table: Option<PathBuf>) -> Self {
        Self { table }
    }

    /// Returns the configured table path, if any.
    pub fn table(&self) -> Option<&Path> {
        self.table.as_deref()
    }
}

/// Compositing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositorConfig {
    /// Dimensions to composite. Inactive dimensions hold their identity value.
    #[serde(default = "default_layers")]
    layers: Vec<Dimension>,

    /// Valence magnitude at or below which a contribution never conflicts.
    #[serde(default = "default_conflict_threshold")]
    conflict_threshold: f64,

    /// Semantic weight given to literal group text.
    #[serde(default = "default_literal_weight")]
    literal_weight: f64,
}

fn default_layers() -> Vec<Dimension> {
    Dimension::ALL.to_vec()
}

fn default_conflict_threshold() -> f64 {
    1e-9
}

fn default_literal_weight() -> f64 {
    1.0
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            conflict_threshold: default_conflict_threshold(),
            literal_weight: default_literal_weight(),
        }
    }
}

impl CompositorConfig {
    pub fn new(layers: Vec<Dimension>, conflict_threshold: f64, literal_weight: f64) -> Self {
        Self {
            layers,
            conflict_threshold,
            literal_weight,
        }
    }

    /// Returns the active dimensions in configuration order.
    pub fn layers(&self) -> &[Dimension] {
        &self.layers
    }

    /// Returns `true` when `dimension` is composited.
    pub fn is_active(&self, dimension: Dimension) -> bool {
        self.layers.contains(&dimension)
    }

    pub fn conflict_threshold(&self) -> f64 {
        self.conflict_threshold
    }

    pub fn literal_weight(&self) -> f64 {
        self.literal_weight
    }

    fn validate(&self) -> Result<(), String> {
        if !self.conflict_threshold.is_finite() || self.conflict_threshold < 0.0 {
            return Err(format!(
                "compositor.conflict_threshold must be a non-negative number, got {}",
                self.conflict_threshold
            ));
        }
        if !self.literal_weight.is_finite() {
            return Err(format!(
                "compositor.literal_weight must be finite, got {}",
                self.literal_weight
            ));
        }
        for (position, dimension) in self.layers.iter().enumerate() {
            if self.layers[..position].contains(dimension) {
                return Err(format!("compositor.layers lists `{dimension}` twice"));
            }
        }
        Ok(())
    }
}

/// Parse acceptance settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ParserConfig {
    /// Reject expressions with unrecovered diagnostics instead of composing
    /// a degraded message.
    #[serde(default)]
    strict: bool,
}

impl ParserConfig {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert!(config.symbols().table().is_none());
        assert_eq!(config.compositor().layers(), Dimension::ALL);
        assert_approx_eq!(f64, config.compositor().conflict_threshold(), 1e-9);
        assert_approx_eq!(f64, config.compositor().literal_weight(), 1.0);
        assert!(!config.parser().strict());
    }

    #[test]
    fn test_full_document() {
        let config = AppConfig::from_toml_str(
            r#"
            [symbols]
            table = "tables/rosetta.toml"

            [compositor]
            layers = ["logical"]
            conflict_threshold = 0.25
            literal_weight = 0.5

            [parser]
            strict = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.symbols().table(),
            Some(Path::new("tables/rosetta.toml"))
        );
        assert_eq!(config.compositor().layers(), [Dimension::Logical]);
        assert_approx_eq!(f64, config.compositor().conflict_threshold(), 0.25);
        assert_approx_eq!(f64, config.compositor().literal_weight(), 0.5);
        assert!(config.parser().strict());
    }

    #[test]
    fn test_unknown_layer_is_rejected() {
        let err = AppConfig::from_toml_str("[compositor]\nlayers = [\"olfactory\"]").unwrap_err();
        assert!(matches!(err, KspkError::Settings(_)));
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let err = AppConfig::from_toml_str("[compositor]\nconflict_threshold = -1.0").unwrap_err();
        assert!(err.to_string().contains("conflict_threshold"));
    }

    #[test]
    fn test_duplicate_layer_is_rejected() {
        let err = AppConfig::from_toml_str("[compositor]\nlayers = [\"spatial\", \"spatial\"]")
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default()
            .with_table("custom.toml")
            .with_strict(true);

        assert_eq!(config.symbols().table(), Some(Path::new("custom.toml")));
        assert!(config.parser().strict());
    }
}
