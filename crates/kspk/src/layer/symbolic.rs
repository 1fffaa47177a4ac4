//! Semantic and logical content.
//!
//! Both dimensions re-express the tree restricted to the symbols that carry
//! weight in them. Operator identity and operand order are kept; symbols with
//! zero weight are transparent and let their operands through.

use std::fmt::Write as _;

use kspk_core::{Dimension, SymbolId, SymbolTable};
use kspk_parser::NodeId;

use crate::compose::{NodeContext, Role};

use super::Layer;

/// A symbolic expression over the weighted symbols of one dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SymbolicExpr {
    /// No contribution.
    #[default]
    Empty,
    /// A weighted symbol without operands in this dimension.
    Term {
        symbol: SymbolId,
        weight: f64,
        source: NodeId,
    },
    /// Verbatim literal text.
    Literal {
        text: String,
        weight: f64,
        source: NodeId,
    },
    /// A weighted operator applied to its operands.
    Apply {
        op: SymbolId,
        weight: f64,
        source: NodeId,
        operands: Vec<SymbolicExpr>,
    },
    /// Operands that pass through a transparent node side by side.
    Sequence(Vec<SymbolicExpr>),
}

impl SymbolicExpr {
    pub fn is_empty(&self) -> bool {
        matches!(self, SymbolicExpr::Empty)
    }

    /// The node this expression came from; `None` for empty and sequences.
    pub fn source(&self) -> Option<NodeId> {
        match self {
            SymbolicExpr::Term { source, .. }
            | SymbolicExpr::Literal { source, .. }
            | SymbolicExpr::Apply { source, .. } => Some(*source),
            SymbolicExpr::Empty | SymbolicExpr::Sequence(_) => None,
        }
    }

    /// Collapse pass-through operands: none is empty, one stands for itself.
    fn sequence(mut items: Vec<SymbolicExpr>) -> SymbolicExpr {
        match items.len() {
            0 => SymbolicExpr::Empty,
            1 => items.pop().unwrap_or_default(),
            _ => SymbolicExpr::Sequence(items),
        }
    }

    /// Render with symbol keys, e.g. `⊕(⬢, "analysis")`.
    pub fn render(&self, table: &SymbolTable) -> String {
        let mut out = String::new();
        self.render_into(table, &mut out);
        out
    }

    fn render_into(&self, table: &SymbolTable, out: &mut String) {
        match self {
            SymbolicExpr::Empty => out.push('∅'),
            SymbolicExpr::Term { symbol, .. } => out.push_str(table.key(*symbol)),
            SymbolicExpr::Literal { text, .. } => {
                // Writing into a String cannot fail.
                let _ = write!(out, "{text:?}");
            }
            SymbolicExpr::Apply { op, operands, .. } => {
                out.push_str(table.key(*op));
                out.push('(');
                render_list(operands, ", ", table, out);
                out.push(')');
            }
            SymbolicExpr::Sequence(items) => {
                out.push('[');
                render_list(items, "; ", table, out);
                out.push(']');
            }
        }
    }
}

fn render_list(items: &[SymbolicExpr], separator: &str, table: &SymbolTable, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        item.render_into(table, out);
    }
}

/// Builds [`SymbolicExpr`] content for one dimension.
pub(crate) struct SymbolicLayer {
    dimension: Dimension,
    /// Weight of literal text; only meaningful for the semantic dimension.
    literal_weight: f64,
}

impl SymbolicLayer {
    pub(crate) fn new(dimension: Dimension, literal_weight: f64) -> Self {
        Self {
            dimension,
            literal_weight,
        }
    }

    fn literal_weight(&self) -> f64 {
        if self.dimension == Dimension::Semantic {
            self.literal_weight
        } else {
            0.0
        }
    }
}

impl Layer for SymbolicLayer {
    type Content = SymbolicExpr;

    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn combine(&mut self, node: &NodeContext<'_>, children: Vec<SymbolicExpr>) -> SymbolicExpr {
        if node.role() == Role::Literal {
            let weight = self.literal_weight();
            return match node.literal_text() {
                Some(text) if weight != 0.0 => SymbolicExpr::Literal {
                    text: text.trim().to_string(),
                    weight,
                    source: node.id(),
                },
                _ => SymbolicExpr::Empty,
            };
        }

        let operands: Vec<_> = children.into_iter().filter(|c| !c.is_empty()).collect();
        let weight = node.weight(self.dimension);

        let Some(symbol) = node.symbol().filter(|_| weight != 0.0) else {
            return SymbolicExpr::sequence(operands);
        };

        if operands.is_empty() {
            SymbolicExpr::Term {
                symbol,
                weight,
                source: node.id(),
            }
        } else {
            SymbolicExpr::Apply {
                op: symbol,
                weight,
                source: node.id(),
                operands,
            }
        }
    }

    fn contributes(&self, node: &NodeContext<'_>) -> bool {
        match node.role() {
            Role::Literal => self.literal_weight() != 0.0,
            _ => node.weight(self.dimension) != 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use kspk_core::SymbolTable;

    use crate::{MessageBuilder, config::AppConfig};

    use super::*;

    fn semantic(source: &str) -> (String, String) {
        let builder = MessageBuilder::builtin(AppConfig::default()).unwrap();
        let message = builder.process(source).unwrap();
        let table = builder.table();
        (
            message.semantic().render(table),
            message.logical().render(table),
        )
    }

    #[test]
    fn test_operator_identity_is_kept() {
        let (semantic, logical) = semantic("⬢⊕⟨analysis⟩");
        assert_eq!(semantic, "⊕(\"analysis\")");
        assert_eq!(logical, "⊕");
    }

    #[test]
    fn test_zero_weight_operator_is_transparent() {
        // ♦ carries no semantic weight; both literals pass through.
        let (semantic, _) = semantic("⟨a⟩♦⟨b⟩");
        assert_eq!(semantic, "[\"a\"; \"b\"]");
    }

    #[test]
    fn test_nested_operators() {
        let (semantic, logical) = semantic("⟨a⟩⊕⟨b⟩⊗⟨c⟩");
        assert_eq!(semantic, "⊕(\"a\", ⊗(\"b\", \"c\"))");
        assert_eq!(logical, "⊕(⊗)");
    }

    #[test]
    fn test_empty_expression() {
        let table = SymbolTable::builtin().unwrap();
        assert_eq!(SymbolicExpr::Empty.render(&table), "∅");
        assert_eq!(semantic("").0, "∅");
    }
}
