//! The composited output of one expression.

use std::fmt::Write as _;

use indexmap::IndexMap;

use kspk_core::{Dimension, SymbolTable};
use kspk_parser::{Ast, Diagnostic, NodeId};

use crate::{
    compose::Composition,
    layer::{EmotionVector, SpatialShape, SymbolicExpr, Timeline},
};

/// Nodes that contributed to each dimension, in post-order.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    contributors: IndexMap<Dimension, Vec<NodeId>>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            contributors: Dimension::ALL
                .into_iter()
                .map(|dimension| (dimension, Vec::new()))
                .collect(),
        }
    }
}

impl Provenance {
    pub(crate) fn record(&mut self, dimension: Dimension, node: NodeId) {
        self.contributors.entry(dimension).or_default().push(node);
    }

    /// Nodes whose own symbol contributed to `dimension`.
    pub fn contributors(&self, dimension: Dimension) -> &[NodeId] {
        self.contributors
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `(dimension, contributors)` pairs in canonical dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[NodeId])> + '_ {
        self.contributors
            .iter()
            .map(|(dimension, nodes)| (*dimension, nodes.as_slice()))
    }
}

/// Five synchronized layers of content plus the tree they came from.
///
/// A message is built once per expression and never changes afterwards.
/// Layer elements refer to nodes of [`MultiModalMessage::ast`] by [`NodeId`].
#[derive(Debug, Clone)]
pub struct MultiModalMessage {
    semantic: SymbolicExpr,
    temporal: Timeline,
    spatial: SpatialShape,
    logical: SymbolicExpr,
    emotional: EmotionVector,
    ast: Ast,
    provenance: Provenance,
    diagnostics: Vec<Diagnostic>,
}

impl MultiModalMessage {
    /// Assemble a message; parse diagnostics come first, compositing
    /// warnings after them.
    pub(crate) fn new(ast: Ast, mut diagnostics: Vec<Diagnostic>, composition: Composition) -> Self {
        let Composition {
            layers,
            provenance,
            diagnostics: warnings,
        } = composition;
        diagnostics.extend(warnings);

        Self {
            semantic: layers.semantic,
            temporal: layers.temporal,
            spatial: layers.spatial,
            logical: layers.logical,
            emotional: layers.emotional,
            ast,
            provenance,
            diagnostics,
        }
    }

    /// The semantic layer.
    pub fn semantic(&self) -> &SymbolicExpr {
        &self.semantic
    }

    /// The temporal layer.
    pub fn temporal(&self) -> &Timeline {
        &self.temporal
    }

    /// The spatial layer.
    pub fn spatial(&self) -> &SpatialShape {
        &self.spatial
    }

    /// The logical layer.
    pub fn logical(&self) -> &SymbolicExpr {
        &self.logical
    }

    /// The emotional layer.
    pub fn emotional(&self) -> EmotionVector {
        self.emotional
    }

    /// The parsed tree the layers refer to.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Root of [`Self::ast`].
    pub fn root(&self) -> NodeId {
        self.ast.root()
    }

    /// Which nodes contributed to each dimension.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Parse diagnostics followed by compositing warnings.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` when parsing or compositing had to repair something.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty() || self.ast.iter().any(|(_, node)| node.is_degraded())
    }

    /// Returns `true` when some diagnostic could not be recovered from.
    pub fn has_unrecovered(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_recovered())
    }

    /// Render one line per dimension followed by a diagnostic count.
    pub fn summary(&self, table: &SymbolTable) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "semantic:  {}", self.semantic.render(table));
        let _ = writeln!(
            out,
            "temporal:  {} (duration {})",
            self.temporal.render(table),
            self.temporal.duration()
        );
        let _ = writeln!(out, "spatial:   {}", self.spatial.render(table));
        let _ = writeln!(out, "logical:   {}", self.logical.render(table));
        let _ = writeln!(out, "emotional: {}", self.emotional);

        let unrecovered = self.diagnostics.iter().filter(|d| !d.is_recovered()).count();
        let _ = writeln!(
            out,
            "diagnostics: {} ({unrecovered} unrecovered)",
            self.diagnostics.len()
        );
        out
    }
}
