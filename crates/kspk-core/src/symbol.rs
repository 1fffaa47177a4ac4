//! Symbol metadata consumed by the lexer, parser and compositor.
//!
//! A [`SymbolDefinition`] describes how one symbol key participates in an
//! expression: its [`Category`], binding power, [`Associativity`], arity and
//! per-dimension weights. Definitions are plain data; the parser and the
//! compositor only ever read these declared fields.

use std::fmt;

use serde::Deserialize;
use string_interner::{DefaultSymbol, Symbol as _};

use crate::dimension::{Affect, Dimension, LayerWeights};

/// Handle to a symbol interned in a [`SymbolTable`](crate::SymbolTable).
///
/// Handles are only meaningful for the table that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(DefaultSymbol);

impl SymbolId {
    pub(crate) fn new(symbol: DefaultSymbol) -> Self {
        Self(symbol)
    }

    pub(crate) fn symbol(self) -> DefaultSymbol {
        self.0
    }

    /// Dense index of this symbol inside its table.
    pub fn index(self) -> usize {
        self.0.to_usize()
    }
}

/// Syntactic role of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A primary expression on its own.
    Atom,
    /// Prefix operator taking the expression that follows.
    UnaryOperator,
    /// Infix operator between two expressions.
    BinaryOperator,
    /// Opens a grouping; paired with a [`Category::GroupClose`] symbol.
    GroupOpen,
    /// Closes a grouping.
    GroupClose,
    /// Postfix operator attaching to the preceding operand.
    Modifier,
}

impl Category {
    /// The only arity a symbol of this category may declare.
    pub fn arity(self) -> u8 {
        match self {
            Category::Atom | Category::GroupOpen | Category::GroupClose => 0,
            Category::UnaryOperator | Category::Modifier => 1,
            Category::BinaryOperator => 2,
        }
    }

    /// Returns `true` for categories that apply to operands.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Category::UnaryOperator | Category::BinaryOperator | Category::Modifier
        )
    }

    /// Returns `true` for the grouping delimiters.
    pub fn is_delimiter(self) -> bool {
        matches!(self, Category::GroupOpen | Category::GroupClose)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Atom => "atom",
            Category::UnaryOperator => "unary operator",
            Category::BinaryOperator => "binary operator",
            Category::GroupOpen => "group open",
            Category::GroupClose => "group close",
            Category::Modifier => "modifier",
        };
        f.write_str(name)
    }
}

/// How operators of equal precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Associativity {
    #[default]
    Left,
    Right,
    /// Chaining at equal precedence is ambiguous without explicit grouping.
    None,
}

/// How the content between a group's delimiters is lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Content is always an expression.
    #[default]
    Structural,
    /// Content is always verbatim literal text.
    Opaque,
    /// Content is an expression when it consists only of known symbols,
    /// literal text otherwise.
    Auto,
}

/// How an operator combines the spatial descriptors of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialMode {
    Union,
    Nest,
    Sequence,
}

impl SpatialMode {
    /// Mode used when an operator declares none.
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::BinaryOperator => SpatialMode::Union,
            Category::UnaryOperator | Category::Modifier => SpatialMode::Nest,
            Category::Atom | Category::GroupOpen | Category::GroupClose => SpatialMode::Sequence,
        }
    }
}

/// Parsing and composition metadata for one symbol key.
///
/// # Example
///
/// ```
/// # use kspk_core::{Associativity, Category, Dimension, SymbolDefinition};
/// let oplus = SymbolDefinition::binary("⊕", 3, Associativity::Left)
///     .with_weight(Dimension::Semantic, 1.0)
///     .with_weight(Dimension::Logical, 1.0)
///     .with_meaning("logical_operation");
///
/// assert_eq!(oplus.category(), Category::BinaryOperator);
/// assert_eq!(oplus.arity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDefinition {
    key: String,
    category: Category,
    precedence: u32,
    associativity: Associativity,
    arity: u8,
    weights: LayerWeights,
    meaning: Option<String>,
    closes_with: Option<String>,
    group_mode: GroupMode,
    spatial_mode: Option<SpatialMode>,
    affect: Option<Affect>,
}

impl SymbolDefinition {
    /// Create a definition with the category's arity and no weights.
    pub fn new(key: impl Into<String>, category: Category) -> Self {
        Self {
            key: key.into(),
            category,
            precedence: 0,
            associativity: Associativity::default(),
            arity: category.arity(),
            weights: LayerWeights::zero(),
            meaning: None,
            closes_with: None,
            group_mode: GroupMode::default(),
            spatial_mode: None,
            affect: None,
        }
    }

    pub fn atom(key: impl Into<String>) -> Self {
        Self::new(key, Category::Atom)
    }

    pub fn unary(key: impl Into<String>, precedence: u32) -> Self {
        Self::new(key, Category::UnaryOperator).with_precedence(precedence)
    }

    pub fn binary(key: impl Into<String>, precedence: u32, associativity: Associativity) -> Self {
        Self::new(key, Category::BinaryOperator)
            .with_precedence(precedence)
            .with_associativity(associativity)
    }

    pub fn modifier(key: impl Into<String>, precedence: u32) -> Self {
        Self::new(key, Category::Modifier).with_precedence(precedence)
    }

    pub fn group_open(key: impl Into<String>, closes_with: impl Into<String>, mode: GroupMode) -> Self {
        let mut definition = Self::new(key, Category::GroupOpen);
        definition.closes_with = Some(closes_with.into());
        definition.group_mode = mode;
        definition
    }

    pub fn group_close(key: impl Into<String>) -> Self {
        Self::new(key, Category::GroupClose)
    }

    pub fn with_precedence(mut self, precedence: u32) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn with_associativity(mut self, associativity: Associativity) -> Self {
        self.associativity = associativity;
        self
    }

    /// Override the declared arity. Validated when the table is built.
    pub fn with_arity(mut self, arity: u8) -> Self {
        self.arity = arity;
        self
    }

    pub fn with_weight(mut self, dimension: Dimension, weight: f64) -> Self {
        self.weights = self.weights.with(dimension, weight);
        self
    }

    pub fn with_weights(mut self, weights: LayerWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    /// Declare the closing key. Only valid on group-open symbols.
    pub fn with_closes_with(mut self, closes_with: impl Into<String>) -> Self {
        self.closes_with = Some(closes_with.into());
        self
    }

    pub fn with_group_mode(mut self, mode: GroupMode) -> Self {
        self.group_mode = mode;
        self
    }

    pub fn with_spatial_mode(mut self, mode: SpatialMode) -> Self {
        self.spatial_mode = Some(mode);
        self
    }

    pub fn with_affect(mut self, affect: Affect) -> Self {
        self.affect = Some(affect);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn arity(&self) -> u8 {
        self.arity
    }

    pub fn weights(&self) -> &LayerWeights {
        &self.weights
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights.get(dimension)
    }

    /// Human-readable meaning, falling back to the key.
    pub fn meaning(&self) -> &str {
        self.meaning.as_deref().unwrap_or(&self.key)
    }

    pub fn closes_with(&self) -> Option<&str> {
        self.closes_with.as_deref()
    }

    pub fn group_mode(&self) -> GroupMode {
        self.group_mode
    }

    /// Declared spatial mode, or the category default.
    pub fn spatial_mode(&self) -> SpatialMode {
        self.spatial_mode
            .unwrap_or_else(|| SpatialMode::default_for(self.category))
    }

    /// Declared emotional profile, or the one implied by the emotional weight.
    pub fn affect(&self) -> Affect {
        self.affect
            .unwrap_or_else(|| Affect::from_weight(self.weight(Dimension::Emotional)))
    }

    pub(crate) fn declared_affect(&self) -> Option<Affect> {
        self.affect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_category_arity() {
        assert_eq!(SymbolDefinition::atom("⬢").arity(), 0);
        assert_eq!(SymbolDefinition::unary("⧖", 5).arity(), 1);
        assert_eq!(SymbolDefinition::modifier("✧", 6).arity(), 1);
        assert_eq!(
            SymbolDefinition::binary("♦", 4, Associativity::Left).arity(),
            2
        );
        assert_eq!(SymbolDefinition::group_close("⟩").arity(), 0);
    }

    #[test]
    fn test_meaning_falls_back_to_key() {
        assert_eq!(SymbolDefinition::atom("⬢").meaning(), "⬢");
        assert_eq!(
            SymbolDefinition::atom("⬢")
                .with_meaning("spatial_dimension")
                .meaning(),
            "spatial_dimension"
        );
    }

    #[test]
    fn test_spatial_mode_defaults_by_category() {
        let binary = SymbolDefinition::binary("⊕", 3, Associativity::Left);
        assert_eq!(binary.spatial_mode(), SpatialMode::Union);

        let unary = SymbolDefinition::unary("⧖", 5);
        assert_eq!(unary.spatial_mode(), SpatialMode::Nest);

        let declared = binary.with_spatial_mode(SpatialMode::Sequence);
        assert_eq!(declared.spatial_mode(), SpatialMode::Sequence);
    }

    #[test]
    fn test_affect_derived_from_emotional_weight() {
        let diamond = SymbolDefinition::binary("♦", 4, Associativity::Left)
            .with_weight(Dimension::Emotional, 0.75);
        assert_eq!(diamond.affect(), Affect::new(0.75, 0.75, 0.0));

        let declared = diamond.with_affect(Affect::new(0.1, 0.2, 0.3));
        assert_eq!(declared.affect(), Affect::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_group_open_records_closer() {
        let open = SymbolDefinition::group_open("⟨", "⟩", GroupMode::Auto);
        assert_eq!(open.closes_with(), Some("⟩"));
        assert_eq!(open.group_mode(), GroupMode::Auto);
    }
}
