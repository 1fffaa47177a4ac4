//! Spatial content: shape descriptors composed by operator mode.

use std::fmt::Write as _;

use kspk_core::{Dimension, SpatialMode, SymbolId, SymbolTable};
use kspk_parser::NodeId;

use crate::compose::{NodeContext, Role};

use super::Layer;

/// A spatial descriptor.
///
/// Composite shapes always hold at least two parts; fewer collapse to
/// [`SpatialShape::Empty`] or to the single part.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpatialShape {
    #[default]
    Empty,
    /// A weighted symbol occupying `extent`.
    Point {
        symbol: SymbolId,
        extent: f64,
        source: NodeId,
    },
    /// Parts side by side.
    Union {
        source: NodeId,
        parts: Vec<SpatialShape>,
    },
    /// Each part contains the next one.
    Nest {
        source: NodeId,
        parts: Vec<SpatialShape>,
    },
    /// Parts one after another.
    Sequence {
        source: NodeId,
        parts: Vec<SpatialShape>,
    },
}

impl SpatialShape {
    pub fn is_empty(&self) -> bool {
        matches!(self, SpatialShape::Empty)
    }

    /// Size of the shape: the largest part for unions and nests, the sum of
    /// parts for sequences.
    pub fn extent(&self) -> f64 {
        match self {
            SpatialShape::Empty => 0.0,
            SpatialShape::Point { extent, .. } => *extent,
            SpatialShape::Union { parts, .. } | SpatialShape::Nest { parts, .. } => {
                parts.iter().map(SpatialShape::extent).fold(0.0, f64::max)
            }
            SpatialShape::Sequence { parts, .. } => parts.iter().map(SpatialShape::extent).sum(),
        }
    }

    fn compose(mode: SpatialMode, source: NodeId, mut parts: Vec<SpatialShape>) -> Self {
        parts.retain(|part| !part.is_empty());
        if parts.len() < 2 {
            return parts.pop().unwrap_or_default();
        }
        match mode {
            SpatialMode::Union => SpatialShape::Union { source, parts },
            SpatialMode::Nest => SpatialShape::Nest { source, parts },
            SpatialMode::Sequence => SpatialShape::Sequence { source, parts },
        }
    }

    /// Render as nested descriptors, e.g. `union(⬢, ⬢)`.
    pub fn render(&self, table: &SymbolTable) -> String {
        let mut out = String::new();
        self.render_into(table, &mut out);
        out
    }

    fn render_into(&self, table: &SymbolTable, out: &mut String) {
        let (name, parts) = match self {
            SpatialShape::Empty => {
                out.push('∅');
                return;
            }
            SpatialShape::Point { symbol, extent, .. } => {
                out.push_str(table.key(*symbol));
                if *extent != 1.0 {
                    // Writing into a String cannot fail.
                    let _ = write!(out, "×{extent}");
                }
                return;
            }
            SpatialShape::Union { parts, .. } => ("union", parts),
            SpatialShape::Nest { parts, .. } => ("nest", parts),
            SpatialShape::Sequence { parts, .. } => ("seq", parts),
        };

        out.push_str(name);
        out.push('(');
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            part.render_into(table, out);
        }
        out.push(')');
    }
}

/// Builds [`SpatialShape`] content.
pub(crate) struct SpatialLayer;

impl Layer for SpatialLayer {
    type Content = SpatialShape;

    fn dimension(&self) -> Dimension {
        Dimension::Spatial
    }

    fn combine(&mut self, node: &NodeContext<'_>, mut children: Vec<SpatialShape>) -> SpatialShape {
        let weight = node.weight(Dimension::Spatial);
        let mode = node.spatial_mode();

        if let Some(symbol) = node.symbol().filter(|_| weight != 0.0 && node.role() != Role::Literal) {
            let own = SpatialShape::Point {
                symbol,
                extent: weight.abs(),
                source: node.id(),
            };
            // A container encloses its operands; otherwise the operator sits
            // after its first operand.
            let position = match mode {
                SpatialMode::Nest => 0,
                SpatialMode::Union | SpatialMode::Sequence => children.len().min(1),
            };
            children.insert(position, own);
        }

        SpatialShape::compose(mode, node.id(), children)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use kspk_core::{Associativity, GroupMode, SymbolDefinition, SymbolTable};

    use crate::{MessageBuilder, config::AppConfig};

    use super::*;

    fn shape(builder: &MessageBuilder, source: &str) -> (SpatialShape, String) {
        let message = builder.process(source).unwrap();
        let shape = message.spatial().clone();
        let rendered = shape.render(builder.table());
        (shape, rendered)
    }

    fn builtin() -> MessageBuilder {
        MessageBuilder::builtin(AppConfig::default()).unwrap()
    }

    #[test]
    fn test_default_binary_mode_is_union() {
        let (shape, rendered) = shape(&builtin(), "⬢♦⬢");
        assert_eq!(rendered, "union(⬢, ⬢)");
        assert_approx_eq!(f64, shape.extent(), 1.0);
    }

    #[test]
    fn test_declared_modes() {
        let builder = builtin();
        assert_eq!(shape(&builder, "⬢⊗⬢").1, "nest(⬢, ⬢)");

        let (shape, rendered) = shape(&builder, "⬢→⬢→⬢");
        assert_eq!(rendered, "seq(⬢, seq(⬢, ⬢))");
        assert_approx_eq!(f64, shape.extent(), 3.0);
    }

    #[test]
    fn test_single_part_collapses() {
        let (shape, rendered) = shape(&builtin(), "⬢⊕⟨text⟩");
        assert_eq!(rendered, "⬢");
        assert!(matches!(shape, SpatialShape::Point { .. }));
    }

    #[test]
    fn test_empty_when_nothing_is_spatial() {
        let (shape, rendered) = shape(&builtin(), "⟨text⟩");
        assert!(shape.is_empty());
        assert_eq!(rendered, "∅");
    }

    #[test]
    fn test_weighted_operators_take_part() {
        let table = SymbolTable::builder()
            .symbols([
                SymbolDefinition::atom("o").with_weight(Dimension::Spatial, 1.0),
                SymbolDefinition::binary("+", 1, Associativity::Left)
                    .with_weight(Dimension::Spatial, 0.5),
                SymbolDefinition::unary("□", 5).with_weight(Dimension::Spatial, -2.0),
                SymbolDefinition::group_open("(", ")", GroupMode::Structural),
                SymbolDefinition::group_close(")"),
            ])
            .build()
            .unwrap();
        let builder = MessageBuilder::new(AppConfig::default(), table.into());

        assert_eq!(shape(&builder, "o+o").1, "union(o, +×0.5, o)");
        assert_eq!(shape(&builder, "□o").1, "nest(□×2, o)");

        let (shape, rendered) = shape(&builder, "(o o) o");
        assert_eq!(rendered, "seq(seq(o, o), o)");
        assert_approx_eq!(f64, shape.extent(), 3.0);
    }
}
