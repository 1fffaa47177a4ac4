//! Precedence parser for K_Spk token streams.
//!
//! This module structures the token stream from the [`lexer`](super::lexer)
//! into an [`Ast`] using precedence climbing over the binding powers declared
//! in the [`SymbolTable`]. The grammar, from tightest to loosest binding:
//!
//! - **term**: an atom, a literal, or a delimited group, optionally preceded
//!   by prefix unary operators and followed by postfix modifiers
//! - **operand**: one or more juxtaposed terms; several terms stack into an
//!   implicit group
//! - **expression**: operands joined by binary operators
//!
//! Malformed input never aborts the parse. Every problem is recorded as a
//! [`Diagnostic`] and repaired locally when a sound repair exists; otherwise
//! the parser skips ahead to the next group close and carries on with what it
//! has. The public entry point is [`build_ast`].

use kspk_core::{Associativity, Category, SymbolDefinition, SymbolId, SymbolTable};
use log::{debug, trace};
use winnow::stream::{Stream, TokenSlice};

use crate::{
    ast::{Ast, AstBuilder, Delimiters, Leaf, NodeId, NodeKind},
    error::{Diagnostic, DiagnosticCollector, SyntaxError},
    span::Span,
    tokens::{PositionedToken, Token},
};

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Deepest chain of nested prefix operators, groups and right-associative
/// operators the parser descends into.
pub(crate) const MAX_NESTING: usize = 128;

/// Minimum binding power for operands that must bind tighter than
/// `precedence`. Widened so that `u32::MAX` has a successor.
fn tighter_than(precedence: u32) -> u64 {
    u64::from(precedence) + 1
}

/// What the next token means to the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead {
    End,
    Close(SymbolId),
    Binary(SymbolId),
    Modifier(SymbolId),
    /// Anything that can start a term.
    Term,
}

struct Parser<'src, 't> {
    table: &'t SymbolTable,
    input: Input<'src>,
    builder: AstBuilder,
    diagnostics: DiagnosticCollector,
    /// Closers of the groups currently open, innermost last.
    open_groups: Vec<SymbolId>,
    /// Current recursion depth of nested constructs.
    depth: usize,
    source_len: usize,
}

impl<'src, 't> Parser<'src, 't> {
    fn new(
        tokens: &'src [PositionedToken<'src>],
        table: &'t SymbolTable,
        diagnostics: DiagnosticCollector,
        source_len: usize,
    ) -> Self {
        Self {
            table,
            input: TokenSlice::new(tokens),
            builder: AstBuilder::default(),
            diagnostics,
            open_groups: Vec::new(),
            depth: 0,
            source_len,
        }
    }

    fn lookahead(&self) -> Lookahead {
        let Some(token) = self.input.peek_token() else {
            return Lookahead::End;
        };
        let Token::Symbol(id) = token.token else {
            return Lookahead::Term;
        };
        match self.table.get(id).category() {
            Category::GroupClose => Lookahead::Close(id),
            Category::BinaryOperator => Lookahead::Binary(id),
            Category::Modifier => Lookahead::Modifier(id),
            Category::Atom | Category::UnaryOperator | Category::GroupOpen => Lookahead::Term,
        }
    }

    /// Span of the next token, or an empty span at end of input.
    fn next_span(&self) -> Span {
        self.input
            .peek_token()
            .map_or(Span::point(self.source_len), |t| t.span)
    }

    fn definition(&self, id: SymbolId) -> &'t SymbolDefinition {
        self.table.get(id)
    }

    fn key(&self, id: SymbolId) -> &'t str {
        self.table.key(id)
    }

    fn leaf(&mut self, id: SymbolId, span: Span, degraded: bool) -> NodeId {
        self.builder
            .push(NodeKind::Leaf(Leaf::Symbol(id)), span, degraded)
    }

    /// Parse expressions until end of input or a close that this scope must
    /// not consume.
    ///
    /// `closer` is the close symbol the enclosing group waits for, if any.
    fn parse_sequence(&mut self, closer: Option<SymbolId>) -> Vec<NodeId> {
        let mut items = Vec::new();

        loop {
            match self.lookahead() {
                Lookahead::End => break,
                Lookahead::Close(id) if Some(id) == closer || self.open_groups.contains(&id) => {
                    break;
                }
                Lookahead::Close(id) => self.skip_unmatched_close(id),
                _ => {
                    let remaining = self.input.eof_offset();
                    if let Some(node) = self.parse_expression(0) {
                        items.push(node);
                    }
                    if self.input.eof_offset() == remaining {
                        // No progress; skip the token so the loop terminates.
                        self.input.next_token();
                    }
                }
            }
        }

        items
    }

    fn skip_unmatched_close(&mut self, id: SymbolId) {
        let span = self.next_span();
        self.input.next_token();

        let key = self.key(id);
        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::UnmatchedClose {
                    position: span.start(),
                },
                format!("unmatched `{key}`"),
            )
            .with_label(span, "no open group to close")
            .with_help(format!("remove `{key}` or add the opening delimiter"))
            .recovered(),
        );
    }

    /// Precedence climbing entry point.
    fn parse_expression(&mut self, min_precedence: u64) -> Option<NodeId> {
        let left = self.parse_operand()?;
        Some(self.parse_binary_rhs(left, min_precedence))
    }

    /// Fold binary operators of at least `min_precedence` onto `left`.
    fn parse_binary_rhs(&mut self, mut left: NodeId, min_precedence: u64) -> NodeId {
        while let Lookahead::Binary(op) = self.lookahead() {
            let definition = self.definition(op);
            let precedence = definition.precedence();
            if u64::from(precedence) < min_precedence {
                break;
            }

            let op_span = self.next_span();
            self.input.next_token();

            let Some(mut right) = self.parse_right_operand(op, op_span) else {
                return left;
            };

            while let Lookahead::Binary(next) = self.lookahead() {
                let next_definition = self.definition(next);
                let next_precedence = next_definition.precedence();

                let rhs_min = if next_precedence > precedence {
                    tighter_than(precedence)
                } else if next_precedence == precedence {
                    let non_associative = definition.associativity() == Associativity::None
                        || next_definition.associativity() == Associativity::None;
                    if non_associative {
                        self.report_ambiguous(op, op_span, next);
                        break;
                    }
                    if next_definition.associativity() != Associativity::Right {
                        break;
                    }
                    u64::from(precedence)
                } else {
                    break;
                };

                if self.depth >= MAX_NESTING {
                    self.report_too_deep(self.next_span());
                    self.synchronize();
                    break;
                }
                right = self.nested(|parser| parser.parse_binary_rhs(right, rhs_min));
            }

            let span = self.builder.span(left).union(self.builder.span(right));
            left = self
                .builder
                .push(NodeKind::Binary { op, left, right }, span, false);
        }

        left
    }

    /// Parse the operand that follows a binary operator.
    ///
    /// Returns `None` when there is no operand; the operator is then dropped
    /// and its left operand stands on its own.
    fn parse_right_operand(&mut self, op: SymbolId, op_span: Span) -> Option<NodeId> {
        match self.lookahead() {
            Lookahead::End | Lookahead::Close(_) => {
                let key = self.key(op);
                self.diagnostics.emit(
                    Diagnostic::error(
                        SyntaxError::MissingOperand {
                            position: op_span.start(),
                            expected_arity: 2,
                        },
                        format!("binary operator `{key}` is missing its right operand"),
                    )
                    .with_label(op_span, "expects two operands")
                    .with_help(format!("add an operand after `{key}` or remove it"))
                    .recovered(),
                );
                None
            }
            Lookahead::Binary(next) => {
                self.skip_consecutive_binary(op, op_span, next);
                None
            }
            Lookahead::Modifier(_) | Lookahead::Term => self.parse_operand(),
        }
    }

    /// Two binary operators with no operand between them cannot be repaired
    /// locally: report and resynchronize.
    fn skip_consecutive_binary(&mut self, op: SymbolId, op_span: Span, next: SymbolId) {
        let next_span = self.next_span();
        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::MissingOperand {
                    position: next_span.start(),
                    expected_arity: 2,
                },
                format!(
                    "binary operator `{}` follows `{}` with no operand between them",
                    self.key(next),
                    self.key(op)
                ),
            )
            .with_label(next_span, "expected an operand before this operator")
            .with_secondary_label(op_span, "previous operator")
            .with_help("insert an operand; input up to the next group close was skipped"),
        );
        self.synchronize();
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Report that the nesting limit was reached at `span`.
    fn report_too_deep(&mut self, span: Span) {
        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::NestingTooDeep {
                    position: span.start(),
                    limit: MAX_NESTING,
                },
                format!("expression nests deeper than {MAX_NESTING} levels"),
            )
            .with_label(span, "nesting limit reached here")
            .with_help("split the expression; input up to the next group close was skipped"),
        );
    }

    /// Discard tokens up to the close of the current group or end of input.
    ///
    /// Groups opened inside the discarded range are skipped together with
    /// their closes.
    fn synchronize(&mut self) {
        let mut skipped = 0usize;
        let mut depth = 0usize;

        loop {
            match self.lookahead() {
                Lookahead::End => break,
                Lookahead::Close(_) if depth == 0 => break,
                Lookahead::Close(_) => depth -= 1,
                _ => {
                    let opens = self
                        .input
                        .peek_token()
                        .and_then(PositionedToken::symbol)
                        .is_some_and(|id| self.definition(id).category() == Category::GroupOpen);
                    if opens {
                        depth += 1;
                    }
                }
            }
            self.input.next_token();
            skipped += 1;
        }

        debug!(skipped = skipped; "Parser resynchronized");
    }

    fn report_ambiguous(&mut self, op: SymbolId, op_span: Span, next: SymbolId) {
        let next_span = self.next_span();
        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::AmbiguousPrecedence {
                    position: next_span.start(),
                },
                format!(
                    "operators `{}` and `{}` have equal precedence and cannot be chained",
                    self.key(op),
                    self.key(next)
                ),
            )
            .with_label(next_span, "ambiguous here")
            .with_secondary_label(op_span, "same precedence as this operator")
            .with_help("group one side explicitly; grouped left to right for now")
            .recovered(),
        );
    }

    /// One or more juxtaposed terms.
    fn parse_operand(&mut self) -> Option<NodeId> {
        let first = self.parse_term()?;
        let mut terms = vec![first];

        while self.lookahead() == Lookahead::Term {
            match self.parse_term() {
                Some(term) => terms.push(term),
                None => break,
            }
        }

        if terms.len() == 1 {
            return Some(first);
        }

        let span = terms
            .iter()
            .map(|id| self.builder.span(*id))
            .reduce(|a, b| a.union(b))
            .unwrap_or_default();
        Some(self.builder.push(
            NodeKind::Group {
                delimiters: None,
                children: terms,
            },
            span,
            false,
        ))
    }

    /// A primary with its prefix operators and postfix modifiers.
    fn parse_term(&mut self) -> Option<NodeId> {
        let token = self.input.peek_token()?;
        let span = token.span;

        let node = match self.lookahead() {
            Lookahead::End | Lookahead::Close(_) => return None,
            Lookahead::Binary(op) => {
                self.input.next_token();
                if self.depth >= MAX_NESTING {
                    return Some(self.skip_too_deep(op, span));
                }
                self.nested(|parser| parser.parse_leading_binary(op, span))
            }
            Lookahead::Modifier(op) => {
                self.input.next_token();
                self.report_missing_unary_operand(op, span);
                self.leaf(op, span, true)
            }
            Lookahead::Term => {
                self.input.next_token();
                match &token.token {
                    Token::Literal { text, open, close } => self.parse_literal(text, *open, *close, span),
                    Token::Symbol(id) => match self.definition(*id).category() {
                        Category::UnaryOperator | Category::GroupOpen
                            if self.depth >= MAX_NESTING =>
                        {
                            return Some(self.skip_too_deep(*id, span));
                        }
                        Category::UnaryOperator => {
                            self.nested(|parser| parser.parse_prefix(*id, span))
                        }
                        Category::GroupOpen => self.nested(|parser| parser.parse_group(*id, span)),
                        _ => self.leaf(*id, span, false),
                    },
                }
            }
        };

        Some(self.parse_postfix(node))
    }

    /// Give up on a construct past the nesting limit: the symbol that would
    /// open it becomes a degraded leaf and the rest of its scope is skipped.
    /// A skipped group open takes its own close with it.
    fn skip_too_deep(&mut self, id: SymbolId, span: Span) -> NodeId {
        self.report_too_deep(span);
        self.synchronize();

        let closer = self.table.closer_of(id);
        if matches!(self.lookahead(), Lookahead::Close(close) if Some(close) == closer) {
            self.input.next_token();
        }
        self.leaf(id, span, true)
    }

    fn parse_postfix(&mut self, mut node: NodeId) -> NodeId {
        while let Lookahead::Modifier(op) = self.lookahead() {
            let op_span = self.next_span();
            self.input.next_token();
            let span = self.builder.span(node).union(op_span);
            node = self
                .builder
                .push(NodeKind::Unary { op, operand: node }, span, false);
        }
        node
    }

    fn parse_prefix(&mut self, op: SymbolId, op_span: Span) -> NodeId {
        let operand = match self.lookahead() {
            Lookahead::Term => self.parse_expression(tighter_than(self.definition(op).precedence())),
            _ => None,
        };

        let Some(operand) = operand else {
            self.report_missing_unary_operand(op, op_span);
            return self.leaf(op, op_span, true);
        };

        let span = op_span.union(self.builder.span(operand));
        self.builder
            .push(NodeKind::Unary { op, operand }, span, false)
    }

    /// A binary operator where an operand was expected becomes a degraded
    /// single-operand node over what follows.
    fn parse_leading_binary(&mut self, op: SymbolId, op_span: Span) -> NodeId {
        let key = self.key(op);
        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::MissingOperand {
                    position: op_span.start(),
                    expected_arity: 2,
                },
                format!("binary operator `{key}` is missing its left operand"),
            )
            .with_label(op_span, "expects two operands")
            .with_help(format!("place an operand before `{key}`"))
            .recovered(),
        );

        let operand = match self.lookahead() {
            Lookahead::End | Lookahead::Close(_) => None,
            Lookahead::Binary(next) => {
                self.skip_consecutive_binary(op, op_span, next);
                None
            }
            Lookahead::Modifier(_) | Lookahead::Term => {
                self.parse_expression(tighter_than(self.definition(op).precedence()))
            }
        };

        match operand {
            Some(operand) => {
                let span = op_span.union(self.builder.span(operand));
                self.builder
                    .push(NodeKind::Unary { op, operand }, span, true)
            }
            None => self.leaf(op, op_span, true),
        }
    }

    fn report_missing_unary_operand(&mut self, op: SymbolId, op_span: Span) {
        let key = self.key(op);
        let (label, help) = if self.definition(op).category() == Category::Modifier {
            ("expects an operand before it", format!("place an operand before `{key}`"))
        } else {
            ("expects an operand after it", format!("place an operand after `{key}`"))
        };

        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::MissingOperand {
                    position: op_span.start(),
                    expected_arity: 1,
                },
                format!("`{key}` is missing its operand"),
            )
            .with_label(op_span, label)
            .with_help(help)
            .recovered(),
        );
    }

    fn parse_literal(
        &mut self,
        text: &str,
        open: SymbolId,
        close: Option<SymbolId>,
        span: Span,
    ) -> NodeId {
        if close.is_none() {
            self.report_unterminated(open, span);
        }
        self.builder.push(
            NodeKind::Leaf(Leaf::Literal {
                text: text.to_string(),
                open,
                close,
            }),
            span,
            close.is_none(),
        )
    }

    fn parse_group(&mut self, open: SymbolId, open_span: Span) -> NodeId {
        let closer = self.table.closer_of(open);

        if let Some(closer) = closer {
            self.open_groups.push(closer);
        }
        let children = self.parse_sequence(closer);
        if closer.is_some() {
            self.open_groups.pop();
        }

        let closed = match self.lookahead() {
            Lookahead::Close(id) if Some(id) == closer => {
                let close_span = self.next_span();
                self.input.next_token();
                Some((id, close_span))
            }
            _ => None,
        };

        let end = match closed {
            Some((_, close_span)) => close_span,
            None => {
                self.report_unterminated(open, open_span);
                children
                    .last()
                    .map_or(open_span, |last| self.builder.span(*last))
            }
        };

        self.builder.push(
            NodeKind::Group {
                delimiters: Some(Delimiters {
                    open,
                    close: closed.map(|(id, _)| id),
                }),
                children,
            },
            open_span.union(end),
            closed.is_none(),
        )
    }

    fn report_unterminated(&mut self, open: SymbolId, open_span: Span) {
        let key = self.key(open);
        let closer = self.table.closer_of(open).map_or("", |id| self.key(id));
        let here = self.next_span();

        self.diagnostics.emit(
            Diagnostic::error(
                SyntaxError::UnterminatedGroup {
                    position: open_span.start(),
                },
                format!("group `{key}` is never closed"),
            )
            .with_label(Span::point(here.start()), format!("expected `{closer}`"))
            .with_secondary_label(open_span, "group opened here")
            .with_help(format!("add `{closer}` to close the group"))
            .recovered(),
        );
    }

    fn finish(mut self) -> (Ast, DiagnosticCollector) {
        let items = self.parse_sequence(None);

        let root = match items.as_slice() {
            [single] => *single,
            _ => {
                let span = items
                    .iter()
                    .map(|id| self.builder.span(*id))
                    .reduce(|a, b| a.union(b))
                    .unwrap_or_else(|| Span::new(0..self.source_len));
                self.builder.push(
                    NodeKind::Group {
                        delimiters: None,
                        children: items,
                    },
                    span,
                    false,
                )
            }
        };

        (self.builder.finish(root), self.diagnostics)
    }
}

/// Structure a token stream into a syntax tree.
///
/// Always produces a tree; problems are appended to `diagnostics` in the
/// order they are found. `source_len` positions diagnostics found at end of
/// input.
pub fn build_ast(
    tokens: &[PositionedToken<'_>],
    table: &SymbolTable,
    diagnostics: DiagnosticCollector,
    source_len: usize,
) -> (Ast, DiagnosticCollector) {
    let parser = Parser::new(tokens, table, diagnostics, source_len);
    let (ast, diagnostics) = parser.finish();

    debug!(nodes = ast.len(), depth = ast.depth(); "Built syntax tree");
    trace!(root = ast.root().index(); "Syntax tree root");
    (ast, diagnostics)
}
