//! Arena-allocated syntax tree.
//!
//! All nodes of one parse live in a single [`Ast`] and refer to each other by
//! [`NodeId`]. Ids are stable for the lifetime of the tree, which makes them
//! suitable as provenance links from composed layer content back to the
//! source structure.

use std::ops::Index;

use kspk_core::SymbolId;

use crate::span::Span;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A primary value: a table symbol or verbatim group text.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Symbol(SymbolId),
    Literal {
        text: String,
        open: SymbolId,
        close: Option<SymbolId>,
    },
}

/// Explicit delimiters of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: SymbolId,
    /// `None` when the group was closed by recovery.
    pub close: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Leaf),
    /// A prefix operator or postfix modifier applied to one operand.
    Unary { op: SymbolId, operand: NodeId },
    Binary {
        op: SymbolId,
        left: NodeId,
        right: NodeId,
    },
    /// Explicitly delimited content, or juxtaposed operands stacked together
    /// when `delimiters` is `None`.
    Group {
        delimiters: Option<Delimiters>,
        children: Vec<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    span: Span,
    degraded: bool,
}

impl Node {
    /// What the node is, with its children.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Source range covered by the node and its descendants.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` when the node was produced by error recovery.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Returns `true` for symbol and literal leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// The symbol that determines this node's contribution, if any.
    ///
    /// Operators for unary and binary nodes, the symbol of a symbol leaf, the
    /// opening delimiter for literals and explicit groups.
    pub fn symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            NodeKind::Leaf(Leaf::Symbol(id)) => Some(*id),
            NodeKind::Leaf(Leaf::Literal { open, .. }) => Some(*open),
            NodeKind::Unary { op, .. } | NodeKind::Binary { op, .. } => Some(*op),
            NodeKind::Group { delimiters, .. } => delimiters.map(|d| d.open),
        }
    }

    /// Child ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Leaf(_) => Vec::new(),
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Group { children, .. } => children.clone(),
        }
    }
}

/// One parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// The node covering the whole expression.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.post_order().len()
    }

    /// Always `false`: every tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length of the longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, level)) = stack.pop() {
            depth = depth.max(level);
            stack.extend(self.node(id).children().into_iter().map(|c| (c, level + 1)));
        }
        depth
    }

    /// Nodes in post-order: every child before its parent, siblings in
    /// source order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.post_order()
            .into_iter()
            .map(|id| (id, self.node(id)))
    }

    /// Compare shape, symbols and literal text, ignoring spans, node ids,
    /// recovery flags and surrounding whitespace in literal text.
    pub fn structurally_eq(&self, other: &Ast) -> bool {
        let mut pending = vec![(self.root, other.root)];

        while let Some((a, b)) = pending.pop() {
            let (a, b) = (self.node(a), other.node(b));
            let same = match (a.kind(), b.kind()) {
                (NodeKind::Leaf(Leaf::Symbol(x)), NodeKind::Leaf(Leaf::Symbol(y))) => x == y,
                (
                    NodeKind::Leaf(Leaf::Literal {
                        text: tx,
                        open: ox,
                        close: cx,
                    }),
                    NodeKind::Leaf(Leaf::Literal {
                        text: ty,
                        open: oy,
                        close: cy,
                    }),
                ) => tx.trim() == ty.trim() && ox == oy && cx == cy,
                (NodeKind::Unary { op: x, .. }, NodeKind::Unary { op: y, .. })
                | (NodeKind::Binary { op: x, .. }, NodeKind::Binary { op: y, .. }) => x == y,
                (
                    NodeKind::Group { delimiters: dx, .. },
                    NodeKind::Group { delimiters: dy, .. },
                ) => dx == dy,
                _ => false,
            };

            let (ca, cb) = (a.children(), b.children());
            if !same || ca.len() != cb.len() {
                return false;
            }
            pending.extend(ca.into_iter().zip(cb));
        }

        true
    }

    fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.node(id).children().into_iter().rev() {
                stack.push((child, false));
            }
        }

        order
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.node(id)
    }
}

/// Appends nodes to an arena; children are always pushed before parents.
#[derive(Debug, Default)]
pub(crate) struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    pub(crate) fn push(&mut self, kind: NodeKind, span: Span, degraded: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            span,
            degraded,
        });
        id
    }

    pub(crate) fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub(crate) fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}
