//! K_Spk Core Types and Definitions
//!
//! This crate provides the symbol vocabulary shared by every stage of the
//! K_Spk pipeline. It includes:
//!
//! - **Dimensions**: The five content channels and per-symbol weights ([`dimension`] module)
//! - **Symbols**: Categories, associativity and definitions ([`symbol`] module)
//! - **Symbol tables**: The validated, immutable registry ([`SymbolTable`])
//! - **Loading**: TOML table sources and the built-in Rosetta table

pub mod dimension;
pub mod error;
pub mod symbol;

mod loader;
mod table;

pub use dimension::{Affect, Dimension, LayerWeights};
pub use error::ConfigError;
pub use symbol::{Associativity, Category, GroupMode, SpatialMode, SymbolDefinition, SymbolId};
pub use table::{SymbolTable, SymbolTableBuilder};
