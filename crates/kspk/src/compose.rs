//! Layer compositing.
//!
//! The [`Compositor`] walks a syntax tree bottom-up. At every node each active
//! layer combines the content already computed for the node's children with
//! the node's own contribution, taken from the symbol table weights. Nothing
//! in here depends on which symbol a node holds, only on its declared fields.
//!
//! Compositing never fails. Anomalies become warnings on the result.

use std::collections::HashMap;

use log::{debug, trace};

use kspk_core::{Category, Dimension, SpatialMode, SymbolDefinition, SymbolId, SymbolTable};
use kspk_parser::{
    Ast, Diagnostic, NodeId,
    ast::{Leaf, Node, NodeKind},
};

use crate::{
    config::CompositorConfig,
    layer::{
        EmotionVector, EmotionalLayer, Layer, SpatialLayer, SpatialShape, SymbolicExpr,
        SymbolicLayer, TemporalLayer, Timeline,
    },
    message::Provenance,
};

/// The structural role of a node, as seen by the layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// A symbol leaf.
    Atom,
    /// Verbatim group text.
    Literal,
    /// A prefix operator over one operand.
    Prefix,
    /// A postfix modifier over one operand.
    Postfix,
    Binary,
    /// Explicit or implicit grouping.
    Group,
}

/// What a layer may know about the node it combines.
pub(crate) struct NodeContext<'a> {
    id: NodeId,
    node: &'a Node,
    definition: Option<&'a SymbolDefinition>,
    role: Role,
}

impl<'a> NodeContext<'a> {
    fn new(id: NodeId, node: &'a Node, table: &'a SymbolTable) -> Self {
        let definition = node.symbol().map(|symbol| table.get(symbol));
        let role = match node.kind() {
            NodeKind::Leaf(Leaf::Symbol(_)) => Role::Atom,
            NodeKind::Leaf(Leaf::Literal { .. }) => Role::Literal,
            NodeKind::Unary { .. } => match definition.map(SymbolDefinition::category) {
                Some(Category::Modifier) => Role::Postfix,
                _ => Role::Prefix,
            },
            NodeKind::Binary { .. } => Role::Binary,
            NodeKind::Group { .. } => Role::Group,
        };

        Self {
            id,
            node,
            definition,
            role,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn node(&self) -> &'a Node {
        self.node
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn symbol(&self) -> Option<SymbolId> {
        self.node.symbol()
    }

    pub(crate) fn definition(&self) -> Option<&'a SymbolDefinition> {
        self.definition
    }

    /// The node symbol's weight in `dimension`; zero for implicit groups.
    pub(crate) fn weight(&self, dimension: Dimension) -> f64 {
        self.definition.map_or(0.0, |d| d.weight(dimension))
    }

    /// How the node arranges its operands in space.
    pub(crate) fn spatial_mode(&self) -> SpatialMode {
        match self.role {
            Role::Group => SpatialMode::Sequence,
            _ => self
                .definition
                .map_or(SpatialMode::Sequence, SymbolDefinition::spatial_mode),
        }
    }

    pub(crate) fn literal_text(&self) -> Option<&'a str> {
        match self.node.kind() {
            NodeKind::Leaf(Leaf::Literal { text, .. }) => Some(text),
            _ => None,
        }
    }
}

/// Content of all five dimensions for one subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Layers {
    pub(crate) semantic: SymbolicExpr,
    pub(crate) temporal: Timeline,
    pub(crate) spatial: SpatialShape,
    pub(crate) logical: SymbolicExpr,
    pub(crate) emotional: EmotionVector,
}

#[derive(Default)]
struct ChildLayers {
    semantic: Vec<SymbolicExpr>,
    temporal: Vec<Timeline>,
    spatial: Vec<SpatialShape>,
    logical: Vec<SymbolicExpr>,
    emotional: Vec<EmotionVector>,
}

impl ChildLayers {
    fn push(&mut self, layers: Layers) {
        self.semantic.push(layers.semantic);
        self.temporal.push(layers.temporal);
        self.spatial.push(layers.spatial);
        self.logical.push(layers.logical);
        self.emotional.push(layers.emotional);
    }
}

/// The output of compositing one tree.
#[derive(Debug, Clone)]
pub(crate) struct Composition {
    pub(crate) layers: Layers,
    pub(crate) provenance: Provenance,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Walks a tree and builds the content of every active dimension.
pub(crate) struct Compositor<'a> {
    table: &'a SymbolTable,
    config: &'a CompositorConfig,
}

impl<'a> Compositor<'a> {
    pub(crate) fn new(table: &'a SymbolTable, config: &'a CompositorConfig) -> Self {
        Self { table, config }
    }

    pub(crate) fn compose(&self, ast: &Ast) -> Composition {
        let mut semantic = SymbolicLayer::new(Dimension::Semantic, self.config.literal_weight());
        let mut temporal = TemporalLayer;
        let mut spatial = SpatialLayer;
        let mut logical = SymbolicLayer::new(Dimension::Logical, 0.0);
        let mut emotional = EmotionalLayer::new(self.config.conflict_threshold());

        let mut pending: HashMap<NodeId, Layers> = HashMap::new();
        let mut provenance = Provenance::default();

        for (id, node) in ast.iter() {
            let context = NodeContext::new(id, node, self.table);

            let mut children = ChildLayers::default();
            for child in node.children() {
                children.push(pending.remove(&child).unwrap_or_default());
            }

            let layers = Layers {
                semantic: self.step(&mut semantic, &context, children.semantic, &mut provenance),
                temporal: self.step(&mut temporal, &context, children.temporal, &mut provenance),
                spatial: self.step(&mut spatial, &context, children.spatial, &mut provenance),
                logical: self.step(&mut logical, &context, children.logical, &mut provenance),
                emotional: self.step(&mut emotional, &context, children.emotional, &mut provenance),
            };
            pending.insert(id, layers);
        }

        let layers = pending.remove(&ast.root()).unwrap_or_default();
        let diagnostics = emotional.into_diagnostics();

        debug!(
            nodes = ast.len(),
            active_layers = self.config.layers().len(),
            warnings = diagnostics.len();
            "Composited layers"
        );
        trace!(layers:?; "Composited content");

        Composition {
            layers,
            provenance,
            diagnostics,
        }
    }

    /// Run one layer on one node, or produce its identity when inactive.
    fn step<L: Layer>(
        &self,
        layer: &mut L,
        context: &NodeContext<'_>,
        children: Vec<L::Content>,
        provenance: &mut Provenance,
    ) -> L::Content {
        let dimension = layer.dimension();
        if !self.config.is_active(dimension) {
            return L::Content::default();
        }

        if layer.contributes(context) {
            provenance.record(dimension, context.id());
        }
        layer.combine(context, children)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use kspk_core::{Affect, Associativity, GroupMode, SymbolTable};

    use super::*;

    fn builtin() -> SymbolTable {
        SymbolTable::builtin().unwrap()
    }

    fn compose(source: &str, table: &SymbolTable, config: &CompositorConfig) -> Composition {
        let parsed = kspk_parser::parse(source, table);
        Compositor::new(table, config).compose(parsed.ast())
    }

    #[test]
    fn test_atom_populates_only_its_dimensions() {
        let table = builtin();
        let composition = compose("⬢", &table, &CompositorConfig::default());
        let layers = &composition.layers;

        assert!(layers.semantic.is_empty());
        assert!(layers.logical.is_empty());
        assert!(layers.temporal.is_empty());
        assert!(layers.emotional.is_zero());
        assert!(matches!(layers.spatial, SpatialShape::Point { .. }));
        assert_approx_eq!(f64, layers.spatial.extent(), 1.0);
    }

    #[test]
    fn test_diamond_blend_has_no_conflict() {
        let table = builtin();
        let composition = compose("⬢♦⬢", &table, &CompositorConfig::default());

        assert!(composition.diagnostics.is_empty());
        let emotional = composition.layers.emotional;
        assert_approx_eq!(f64, emotional.valence, 1.0);
        assert_approx_eq!(f64, emotional.arousal, 1.0);
        assert_approx_eq!(f64, emotional.dominance, 0.0);

        let SpatialShape::Union { parts, .. } = &composition.layers.spatial else {
            panic!("expected a union of both atoms");
        };
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_provenance_lists_contributors_in_post_order() {
        let table = builtin();
        let parsed = kspk_parser::parse("⬢⊕⬢", &table);
        let composition =
            Compositor::new(&table, &CompositorConfig::default()).compose(parsed.ast());

        let root = parsed.ast().root();
        assert_eq!(composition.provenance.contributors(Dimension::Semantic), [root]);
        assert_eq!(composition.provenance.contributors(Dimension::Spatial).len(), 2);
        assert!(composition.provenance.contributors(Dimension::Temporal).is_empty());
    }

    #[test]
    fn test_inactive_layers_hold_identity() {
        let table = builtin();
        let config = CompositorConfig::new(vec![Dimension::Temporal], 1e-9, 1.0);
        let composition = compose("⧖⬢ ⊕ ⟨note⟩ ♦ ⬢", &table, &config);
        let layers = &composition.layers;

        assert!(!layers.temporal.is_empty());
        assert!(layers.semantic.is_empty());
        assert!(layers.logical.is_empty());
        assert_eq!(layers.spatial, SpatialShape::Empty);
        assert!(layers.emotional.is_zero());
        assert!(
            composition
                .provenance
                .contributors(Dimension::Semantic)
                .is_empty()
        );
    }

    #[test]
    fn test_opposite_valences_conflict() {
        let table = SymbolTable::builder()
            .symbols([
                kspk_core::SymbolDefinition::atom("+").with_weight(Dimension::Emotional, 1.0),
                kspk_core::SymbolDefinition::atom("-").with_weight(Dimension::Emotional, -1.0),
                kspk_core::SymbolDefinition::binary("&", 1, Associativity::Left),
            ])
            .build()
            .unwrap();

        let composition = compose("+&-", &table, &CompositorConfig::default());

        assert_eq!(composition.diagnostics.len(), 1);
        let warning = &composition.diagnostics[0];
        assert_eq!(warning.code(), kspk_parser::error::ErrorCode::E200);
        assert!(warning.severity().is_warning());
        assert!(warning.is_recovered());
        assert_eq!(warning.position(), 0);

        // Blended result is still produced.
        assert_approx_eq!(f64, composition.layers.emotional.valence, 0.0);
        assert_approx_eq!(f64, composition.layers.emotional.arousal, 2.0);
    }

    #[test]
    fn test_conflict_threshold_suppresses_small_valences() {
        let table = SymbolTable::builder()
            .symbols([
                kspk_core::SymbolDefinition::atom("+").with_weight(Dimension::Emotional, 0.1),
                kspk_core::SymbolDefinition::atom("-").with_weight(Dimension::Emotional, -1.0),
            ])
            .build()
            .unwrap();
        let config = CompositorConfig::new(Dimension::ALL.to_vec(), 0.5, 1.0);

        let composition = compose("+ -", &table, &config);
        assert!(composition.diagnostics.is_empty());
    }

    #[test]
    fn test_declared_affect_overrides_weight() {
        let table = SymbolTable::builder()
            .symbols([kspk_core::SymbolDefinition::atom("☺")
                .with_weight(Dimension::Emotional, 0.5)
                .with_affect(Affect::new(0.8, 0.3, 0.6))])
            .build()
            .unwrap();

        let composition = compose("☺", &table, &CompositorConfig::default());
        let emotional = composition.layers.emotional;
        assert_approx_eq!(f64, emotional.valence, 0.8);
        assert_approx_eq!(f64, emotional.arousal, 0.3);
        assert_approx_eq!(f64, emotional.dominance, 0.6);
    }

    #[test]
    fn test_literal_weight_scales_semantic_text() {
        let table = builtin();
        let config = CompositorConfig::new(Dimension::ALL.to_vec(), 1e-9, 0.0);

        let composition = compose("⟨words⟩", &table, &config);
        assert!(composition.layers.semantic.is_empty());

        let composition = compose("⟨words⟩", &table, &CompositorConfig::default());
        assert!(matches!(
            composition.layers.semantic,
            SymbolicExpr::Literal { .. }
        ));
    }

    #[test]
    fn test_structural_group_is_transparent() {
        let table = SymbolTable::builder()
            .symbols([
                kspk_core::SymbolDefinition::atom("a").with_weight(Dimension::Semantic, 1.0),
                kspk_core::SymbolDefinition::group_open("(", ")", GroupMode::Structural),
                kspk_core::SymbolDefinition::group_close(")"),
            ])
            .build()
            .unwrap();

        let grouped = compose("(a)", &table, &CompositorConfig::default());
        let bare = compose("a", &table, &CompositorConfig::default());
        assert!(matches!(grouped.layers.semantic, SymbolicExpr::Term { .. }));
        assert_eq!(
            grouped.layers.semantic.render(&table),
            bare.layers.semantic.render(&table)
        );
    }

    // ===================
    // Strategies
    // ===================

    fn expression_strategy() -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            Just("⬢"),
            Just("♦"),
            Just("⊕"),
            Just("⊗"),
            Just("⊙"),
            Just("→"),
            Just("⧖"),
            Just("✧"),
            Just("⟨"),
            Just("⟩"),
            Just("⟨text⟩"),
            Just(" "),
        ];
        prop::collection::vec(piece, 0..20).prop_map(|pieces| pieces.concat())
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Compositing the same tree twice yields identical content.
    fn check_compositing_is_deterministic(source: &str) -> Result<(), TestCaseError> {
        let table = builtin();
        let config = CompositorConfig::default();
        let parsed = kspk_parser::parse(source, &table);
        let compositor = Compositor::new(&table, &config);

        let first = compositor.compose(parsed.ast());
        let second = compositor.compose(parsed.ast());

        prop_assert_eq!(&first.layers, &second.layers);
        prop_assert_eq!(format!("{:?}", first.layers), format!("{:?}", second.layers));
        prop_assert_eq!(first.provenance, second.provenance);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
        Ok(())
    }

    /// Every contributor recorded in provenance is a node of the tree.
    fn check_provenance_points_into_tree(source: &str) -> Result<(), TestCaseError> {
        let table = builtin();
        let parsed = kspk_parser::parse(source, &table);
        let composition =
            Compositor::new(&table, &CompositorConfig::default()).compose(parsed.ast());

        let reachable: Vec<_> = parsed.ast().iter().map(|(id, _)| id).collect();
        for dimension in Dimension::ALL {
            for id in composition.provenance.contributors(dimension) {
                prop_assert!(reachable.contains(id));
            }
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn compositing_is_deterministic(source in expression_strategy()) {
            check_compositing_is_deterministic(&source)?;
        }

        #[test]
        fn provenance_points_into_tree(source in expression_strategy()) {
            check_provenance_points_into_tree(&source)?;
        }
    }
}
