//! TOML symbol table loader.
//!
//! Symbols are listed as `[symbols."<key>"]` tables and registered in file
//! order:
//!
//! ```toml
//! [symbols."⊕"]
//! category = "binary_operator"
//! precedence = 3
//! meaning = "logical_operation"
//! weights = { semantic = 1.0, logical = 1.0 }
//!
//! [symbols."⟨"]
//! category = "group_open"
//! closes_with = "⟩"
//! mode = "auto"
//!
//! [symbols."⟩"]
//! category = "group_close"
//! ```

use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;

use crate::{
    dimension::{Affect, Dimension},
    error::ConfigError,
    symbol::{Associativity, Category, GroupMode, SpatialMode, SymbolDefinition},
    table::SymbolTable,
};

const BUILTIN_TABLE: &str = include_str!("rosetta.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    #[serde(default)]
    symbols: IndexMap<String, SymbolEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolEntry {
    category: Category,
    #[serde(default)]
    precedence: u32,
    #[serde(default)]
    associativity: Associativity,
    arity: Option<u8>,
    meaning: Option<String>,
    #[serde(default)]
    weights: IndexMap<String, f64>,
    closes_with: Option<String>,
    #[serde(default)]
    mode: GroupMode,
    spatial: Option<SpatialMode>,
    affect: Option<[f64; 3]>,
}

impl SymbolEntry {
    fn into_definition(self, key: String) -> Result<SymbolDefinition, ConfigError> {
        let mut definition = SymbolDefinition::new(key, self.category)
            .with_precedence(self.precedence)
            .with_associativity(self.associativity)
            .with_group_mode(self.mode);

        if let Some(arity) = self.arity {
            definition = definition.with_arity(arity);
        }
        if let Some(meaning) = self.meaning {
            definition = definition.with_meaning(meaning);
        }
        if let Some(closes_with) = self.closes_with {
            definition = definition.with_closes_with(closes_with);
        }
        if let Some(spatial) = self.spatial {
            definition = definition.with_spatial_mode(spatial);
        }
        if let Some([valence, arousal, dominance]) = self.affect {
            definition = definition.with_affect(Affect::new(valence, arousal, dominance));
        }

        for (name, weight) in self.weights {
            let dimension: Dimension = name.parse().map_err(|_| ConfigError::UnknownDimension {
                key: definition.key().to_string(),
                dimension: name.clone(),
            })?;
            definition = definition.with_weight(dimension, weight);
        }

        Ok(definition)
    }
}

impl SymbolTable {
    /// Parse and validate a symbol table from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed TOML, and any validation
    /// error described on [`SymbolTableBuilder::build`](crate::SymbolTableBuilder::build).
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: TableFile = toml::from_str(source)?;
        debug!(entries = file.symbols.len(); "Symbol table source parsed");

        let definitions = file
            .symbols
            .into_iter()
            .map(|(key, entry)| entry.into_definition(key))
            .collect::<Result<Vec<_>, _>>()?;

        SymbolTable::builder().symbols(definitions).build()
    }

    /// The Rosetta table embedded in this crate.
    ///
    /// # Errors
    ///
    /// The embedded table is validated like any other source; an error here
    /// means the shipped table itself is broken.
    pub fn builtin() -> Result<Self, ConfigError> {
        let table = Self::from_toml_str(BUILTIN_TABLE)?;
        info!(symbols = table.len(); "Loaded built-in symbol table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_load_minimal_table() {
        let source = r#"
            [symbols."⬢"]
            category = "atom"
            meaning = "spatial_dimension"
            weights = { spatial = 1.0 }

            [symbols."♦"]
            category = "binary_operator"
            precedence = 4
            associativity = "none"
            weights = { emotional = 0.5 }
        "#;

        let table = SymbolTable::from_toml_str(source).expect("valid table");
        assert_eq!(table.len(), 2);

        let hexagon = table.lookup("⬢").unwrap();
        assert_eq!(hexagon.category(), Category::Atom);
        assert_eq!(hexagon.meaning(), "spatial_dimension");
        assert_approx_eq!(f64, hexagon.weight(Dimension::Spatial), 1.0);

        let diamond = table.lookup("♦").unwrap();
        assert_eq!(diamond.precedence(), 4);
        assert_eq!(diamond.associativity(), Associativity::None);
        assert_approx_eq!(f64, diamond.weight(Dimension::Emotional), 0.5);
        assert_approx_eq!(f64, diamond.weight(Dimension::Semantic), 0.0);
    }

    #[test]
    fn test_load_keeps_file_order() {
        let source = r#"
            [symbols."b"]
            category = "atom"

            [symbols."a"]
            category = "atom"

            [symbols."c"]
            category = "atom"
        "#;

        let table = SymbolTable::from_toml_str(source).unwrap();
        let keys: Vec<_> = table.iter().map(|(_, d)| d.key()).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_load_group_and_affect() {
        let source = r#"
            [symbols."("]
            category = "group_open"
            closes_with = ")"
            mode = "opaque"

            [symbols.")"]
            category = "group_close"

            [symbols."!"]
            category = "modifier"
            precedence = 6
            spatial = "union"
            affect = [0.5, 1.0, 0.25]
        "#;

        let table = SymbolTable::from_toml_str(source).unwrap();
        let open = table.lookup("(").unwrap();
        assert_eq!(open.group_mode(), GroupMode::Opaque);
        assert_eq!(open.closes_with(), Some(")"));

        let bang = table.lookup("!").unwrap();
        assert_eq!(bang.spatial_mode(), SpatialMode::Union);
        assert_eq!(bang.affect(), Affect::new(0.5, 1.0, 0.25));
    }

    #[test]
    fn test_reject_unknown_dimension() {
        let source = r#"
            [symbols."⬢"]
            category = "atom"
            weights = { colour = 1.0 }
        "#;

        let result = SymbolTable::from_toml_str(source);
        assert!(matches!(result, Err(ConfigError::UnknownDimension { .. })));
    }

    #[test]
    fn test_reject_declared_arity_mismatch() {
        let source = r#"
            [symbols."⧖"]
            category = "unary_operator"
            arity = 2
        "#;

        let result = SymbolTable::from_toml_str(source);
        assert!(matches!(result, Err(ConfigError::ArityMismatch { .. })));
    }

    #[test]
    fn test_reject_malformed_toml() {
        let result = SymbolTable::from_toml_str("[symbols.\"⬢\"\ncategory = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));

        let unknown_category = r#"
            [symbols."⬢"]
            category = "noun"
        "#;
        assert!(matches!(
            SymbolTable::from_toml_str(unknown_category),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_reject_unpaired_open_from_file() {
        let source = r#"
            [symbols."⟨"]
            category = "group_open"
            closes_with = "⟩"
        "#;

        let result = SymbolTable::from_toml_str(source);
        assert!(matches!(result, Err(ConfigError::UnknownCloser { .. })));
    }

    #[test]
    fn test_builtin_table_is_valid() {
        let table = SymbolTable::builtin().expect("built-in table validates");

        for key in ["⊕", "⊗", "⊙", "∧", "∨", "→", "⧖", "♦", "⬢", "✧", "⟨", "⟩"] {
            assert!(table.lookup(key).is_some(), "missing built-in symbol {key}");
        }

        let arrow = table.lookup("→").unwrap();
        assert_eq!(arrow.associativity(), Associativity::Right);
        let lowest = table
            .iter()
            .filter(|(_, d)| d.category() == Category::BinaryOperator)
            .map(|(_, d)| d.precedence())
            .min();
        assert_eq!(lowest, Some(arrow.precedence()));

        let open = table.id("⟨").unwrap();
        assert_eq!(table.closer_of(open), table.id("⟩"));
        assert_eq!(table.get(open).group_mode(), GroupMode::Auto);
    }
}
