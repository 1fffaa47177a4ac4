//! Lexical analyzer for K_Spk expressions.
//!
//! The lexer converts an expression string into a stream of [`Token`]s bound
//! to [`SymbolTable`] entries. Whitespace between symbols is skipped. Symbol
//! keys are matched longest-first, so a multi-codepoint key wins over any
//! decomposition into shorter keys.
//!
//! Groups whose open symbol declares [`GroupMode::Opaque`] capture their
//! content verbatim as a single literal token. [`GroupMode::Auto`] groups do
//! the same unless their content consists only of known symbols, in which
//! case the content is tokenized like any other part of the expression.
//!
//! The public entry point is [`tokenize`]. It never fails: unknown codepoints
//! are reported as diagnostics and skipped.

use kspk_core::{Category, GroupMode, SymbolId, SymbolTable};
use log::{debug, trace};
use winnow::{
    Parser as _,
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::take_while,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, LexError},
    span::Span,
    tokens::{PositionedToken, Token},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

/// Skip a run of whitespace
fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    take_while(1.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// Parse the longest symbol key at the current position
fn symbol(input: &mut Input<'_>, table: &SymbolTable) -> IResult<SymbolId> {
    let rest = input.peek_finish();
    let (id, len) = table
        .longest_match(rest)
        .ok_or_else(|| ErrMode::Backtrack(ContextError::new()))?;
    input.next_slice(len);
    Ok(id)
}

/// Byte length of a group's content, up to its matching close.
///
/// `text` starts right after the open symbol. Nested opens of the same pair
/// are counted so that the close belonging to the outer group is found.
fn group_content_len(
    text: &str,
    open: SymbolId,
    close: SymbolId,
    table: &SymbolTable,
) -> Option<usize> {
    let mut depth = 1usize;
    let mut offset = 0;

    while let Some(ch) = text[offset..].chars().next() {
        match table.longest_match(&text[offset..]) {
            Some((id, len)) if id == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
                offset += len;
            }
            Some((id, len)) => {
                if id == open {
                    depth += 1;
                }
                offset += len;
            }
            None => offset += ch.len_utf8(),
        }
    }

    None
}

/// Returns `true` when `content` tokenizes completely into known symbols.
///
/// Nested literal-capable groups are skipped as a whole when they are closed
/// inside `content`.
fn is_structural(content: &str, table: &SymbolTable) -> bool {
    let mut offset = 0;

    while let Some(ch) = content[offset..].chars().next() {
        if ch.is_whitespace() {
            offset += ch.len_utf8();
            continue;
        }

        let Some((id, len)) = table.longest_match(&content[offset..]) else {
            return false;
        };
        offset += len;

        let definition = table.get(id);
        if definition.category() != Category::GroupOpen
            || definition.group_mode() == GroupMode::Structural
        {
            continue;
        }

        let Some(close) = table.closer_of(id) else {
            return false;
        };
        let Some(inner) = group_content_len(&content[offset..], id, close, table) else {
            return false;
        };
        offset += inner + table.key(close).len();
    }

    true
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a, 't> {
    table: &'t SymbolTable,
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a, 't> Lexer<'a, 't> {
    fn new(table: &'t SymbolTable) -> Self {
        Self {
            table,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and diagnostics.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let start = input.current_token_start();

            if whitespace(&mut input).is_ok() {
                continue;
            }

            match symbol(&mut input, self.table) {
                Ok(id) => self.symbol_token(id, start, &mut input),
                Err(_) => self.unknown_symbol(start, &mut input),
            }
        }
    }

    /// Emit the token for a matched symbol, capturing literal group content
    /// when the symbol opens a literal-capable group.
    fn symbol_token(&mut self, id: SymbolId, start: usize, input: &mut Input<'a>) {
        let table = self.table;
        let definition = table.get(id);
        let mode = definition.group_mode();
        let literal_close = table.closer_of(id).filter(|_| {
            definition.category() == Category::GroupOpen && mode != GroupMode::Structural
        });

        let Some(close) = literal_close else {
            let end = input.current_token_start();
            self.push(Token::Symbol(id), start..end);
            return;
        };

        let rest = input.peek_finish();
        let extent = group_content_len(rest, id, close, table);
        let content_len = extent.unwrap_or(rest.len());

        if mode == GroupMode::Auto && is_structural(&rest[..content_len], table) {
            let end = input.current_token_start();
            self.push(Token::Symbol(id), start..end);
            return;
        }

        let text = input.next_slice(content_len);
        let close = extent.map(|_| {
            input.next_slice(table.key(close).len());
            close
        });
        let end = input.current_token_start();

        trace!(text = text, terminated = close.is_some(); "Captured literal group");
        self.push(
            Token::Literal {
                text,
                open: id,
                close,
            },
            start..end,
        );
    }

    /// Report and skip one codepoint that matches no symbol.
    fn unknown_symbol(&mut self, start: usize, input: &mut Input<'a>) {
        let Some(ch) = input.next_token() else {
            return;
        };
        let end = input.current_token_start();

        self.diagnostics.emit(
            Diagnostic::error(
                LexError::UnknownSymbol {
                    position: start,
                    symbol: ch,
                },
                format!("unknown symbol `{ch}`"),
            )
            .with_label(Span::new(start..end), "not in the symbol table")
            .with_help("define the symbol in the table, or wrap free text in a literal group")
            .recovered(),
        );
    }

    fn push(&mut self, token: Token<'a>, range: std::ops::Range<usize>) {
        self.tokens.push(PositionedToken::new(token, Span::new(range)));
    }

    fn finish(self) -> (Vec<PositionedToken<'a>>, DiagnosticCollector) {
        (self.tokens, self.diagnostics)
    }
}

/// Tokenize an expression against a symbol table.
///
/// Always returns the tokens that could be recognized; unknown codepoints
/// are skipped and reported through the returned collector.
pub fn tokenize<'a>(
    source: &'a str,
    table: &SymbolTable,
) -> (Vec<PositionedToken<'a>>, DiagnosticCollector) {
    let mut lexer = Lexer::new(table);
    lexer.tokenize(LocatingSlice::new(source));
    let (tokens, diagnostics) = lexer.finish();

    debug!(tokens = tokens.len(), diagnostics = diagnostics.len(); "Tokenized expression");
    (tokens, diagnostics)
}
