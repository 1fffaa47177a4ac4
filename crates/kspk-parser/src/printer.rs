//! Rendering syntax trees back to text.
//!
//! [`to_source`] produces the canonical symbol string of a tree: no
//! whitespace except a single space where a run of adjacent keys would
//! otherwise lex as different keys. Re-parsing the output of a cleanly parsed tree
//! yields a structurally identical tree.
//!
//! [`tree`] renders an indented outline for logs and tooling.

use std::fmt::Write as _;

use kspk_core::{Category, SymbolId, SymbolTable};

use crate::ast::{Ast, Leaf, NodeId, NodeKind};

/// Serialize a tree to its canonical symbol string.
///
/// # Example
///
/// ```
/// # use kspk_core::SymbolTable;
/// # use kspk_parser::{parse, printer};
/// let table = SymbolTable::builtin().unwrap();
/// let parsed = parse("⬢ ♦ ⟨ ⬢ ⊕ ⬢ ⟩", &table);
///
/// assert_eq!(printer::to_source(parsed.ast(), &table), "⬢♦⟨⬢⊕⬢⟩");
/// ```
pub fn to_source(ast: &Ast, table: &SymbolTable) -> String {
    let mut writer = SourceWriter {
        table,
        out: String::new(),
        run_start: None,
        run_ends: Vec::new(),
    };
    let mut steps = vec![Step::Node(ast.root())];

    while let Some(step) = steps.pop() {
        match step {
            Step::Node(id) => push_steps(ast, table, id, &mut steps),
            Step::Key(symbol) => writer.key(table.key(symbol)),
            Step::Text(text) => writer.text(text),
        }
    }

    writer.out
}

/// Pending output, popped from the back of a stack.
enum Step<'a> {
    Node(NodeId),
    Key(SymbolId),
    Text(&'a str),
}

/// Push the steps that print `id`, in reverse output order.
fn push_steps<'a>(ast: &'a Ast, table: &SymbolTable, id: NodeId, steps: &mut Vec<Step<'a>>) {
    match ast[id].kind() {
        NodeKind::Leaf(Leaf::Symbol(symbol)) => steps.push(Step::Key(*symbol)),
        NodeKind::Leaf(Leaf::Literal { text, open, close }) => {
            steps.extend(close.map(Step::Key));
            steps.push(Step::Text(text));
            steps.push(Step::Key(*open));
        }
        NodeKind::Unary { op, operand } => {
            if table.get(*op).category() == Category::Modifier {
                steps.push(Step::Key(*op));
                steps.push(Step::Node(*operand));
            } else {
                steps.push(Step::Node(*operand));
                steps.push(Step::Key(*op));
            }
        }
        NodeKind::Binary { op, left, right } => {
            steps.push(Step::Node(*right));
            steps.push(Step::Key(*op));
            steps.push(Step::Node(*left));
        }
        NodeKind::Group {
            delimiters,
            children,
        } => {
            steps.extend(delimiters.and_then(|d| d.close).map(Step::Key));
            steps.extend(children.iter().rev().map(|child| Step::Node(*child)));
            steps.extend(delimiters.map(|d| Step::Key(d.open)));
        }
    }
}

struct SourceWriter<'t> {
    table: &'t SymbolTable,
    out: String,
    /// Offset in `out` of the first key written since the last space or
    /// literal text.
    run_start: Option<usize>,
    /// End offsets, relative to `run_start`, of the keys in the current run.
    run_ends: Vec<usize>,
}

impl SourceWriter<'_> {
    /// Append a key, preceded by a space when the current run of keys
    /// followed by this one would lex as different keys.
    fn key(&mut self, key: &str) {
        if let Some(start) = self.run_start {
            let joined = format!("{}{key}", &self.out[start..]);
            self.run_ends.push(joined.len());
            if !self.lexes_at(&joined) {
                self.out.push(' ');
                self.run_start = None;
            }
        }

        if self.run_start.is_none() {
            self.run_start = Some(self.out.len());
            self.run_ends.clear();
            self.run_ends.push(key.len());
        }
        self.out.push_str(key);
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
        self.run_start = None;
        self.run_ends.clear();
    }

    /// Whether greedy lexing of `joined` stops exactly at every run end.
    fn lexes_at(&self, joined: &str) -> bool {
        let mut position = 0;
        for &end in &self.run_ends {
            match self.table.longest_match(&joined[position..]) {
                Some((_, len)) if position + len == end => position = end,
                _ => return false,
            }
        }
        true
    }
}

/// Render an indented outline of the tree, one node per line.
///
/// ```text
/// Binary ♦ @0..9
///   Leaf ⬢ @0..3
///   Leaf ⬢ @6..9
/// ```
pub fn tree(ast: &Ast, table: &SymbolTable) -> String {
    let mut out = String::new();
    let mut stack = vec![(ast.root(), 0usize)];

    while let Some((id, indent)) = stack.pop() {
        let node = &ast[id];
        let label = match node.kind() {
            NodeKind::Leaf(Leaf::Symbol(symbol)) => format!("Leaf {}", table.key(*symbol)),
            NodeKind::Leaf(Leaf::Literal { text, .. }) => format!("Literal {text:?}"),
            NodeKind::Unary { op, .. } => format!("Unary {}", table.key(*op)),
            NodeKind::Binary { op, .. } => format!("Binary {}", table.key(*op)),
            NodeKind::Group {
                delimiters: Some(delimiters),
                ..
            } => format!("Group {}", table.key(delimiters.open)),
            NodeKind::Group {
                delimiters: None, ..
            } => "Group".to_string(),
        };

        // Writing into a String cannot fail.
        let _ = write!(out, "{:indent$}{label} @{}", "", node.span(), indent = indent * 2);
        if node.is_degraded() {
            out.push_str(" (degraded)");
        }
        out.push('\n');

        for child in node.children().into_iter().rev() {
            stack.push((child, indent + 1));
        }
    }

    out
}
