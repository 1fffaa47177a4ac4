use kspk_core::SymbolId;
use winnow::stream::Location;

use crate::span::Span;

/// Token types produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    /// A symbol key resolved against the table
    Symbol(SymbolId),

    /// Verbatim text captured between a group's delimiters
    Literal {
        text: &'src str,
        open: SymbolId,
        /// `None` when the input ended before the closing delimiter
        close: Option<SymbolId>,
    },
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }

    /// The symbol this token refers to, if it is a symbol token
    pub fn symbol(&self) -> Option<SymbolId> {
        match self.token {
            Token::Symbol(id) => Some(id),
            Token::Literal { .. } => None,
        }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.end()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}
