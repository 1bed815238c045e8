//! Macro definitions and the expanding token stream.
//!
//! A macro is declared as `macro NAME(P1, P2) (expr)` or
//! `macro NAME(P1, P2) { statements }` and invoked as `NAME(a, b)`. The body
//! is substituted token by token; body tokens are attributed to a new
//! expansion recorded in the [`SourceMap`], while argument tokens keep the
//! spans they had at the call site. A macro whose expansion (directly or
//! through other macros) invokes itself is rejected.

use std::collections::VecDeque;

use portc_core::{ParseError, ParseErrorKind, SourceMap, Span};
use rustc_hash::FxHashMap;

use crate::lexer::{Lexer, Token, TokenKind};

/// A macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro<'ast> {
    pub name: &'ast str,
    pub params: Vec<&'ast str>,
    /// Body tokens, including the enclosing parentheses or braces.
    pub body: Vec<Token<'ast>>,
    pub span: Span,
}

/// All macros defined so far, shared by every file of a compilation.
#[derive(Debug, Default)]
pub struct MacroTable<'ast> {
    macros: FxHashMap<&'ast str, Macro<'ast>>,
}

impl<'ast> MacroTable<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, definition: Macro<'ast>) -> Result<(), ParseError> {
        if self.macros.contains_key(definition.name) {
            return Err(ParseError::new(
                ParseErrorKind::DuplicateMacro,
                definition.span,
                format!("macro {} already defined", definition.name),
            ));
        }
        tracing::debug!(name = definition.name, params = definition.params.len(), "defined macro");
        self.macros.insert(definition.name, definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Macro<'ast>> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

struct Frame<'ast> {
    tokens: Vec<Token<'ast>>,
    pos: usize,
}

/// Token source for the parser: lexes lazily, expands macro invocations and
/// provides arbitrary lookahead over the expanded tokens.
///
/// Lexing and expansion failures are reported as a [`TokenKind::Error`]
/// token; the error itself is retrieved with [`take_error`](Self::take_error).
pub struct TokenStream<'src, 'ast, 's> {
    lexer: Lexer<'src, 'ast>,
    /// One token lexed ahead while checking for a macro invocation.
    pending: Option<Token<'ast>>,
    frames: Vec<Frame<'ast>>,
    lookahead: VecDeque<Token<'ast>>,
    macros: &'s mut MacroTable<'ast>,
    sources: &'s mut SourceMap,
    error: Option<ParseError>,
}

impl<'src, 'ast, 's> TokenStream<'src, 'ast, 's> {
    pub fn new(
        lexer: Lexer<'src, 'ast>,
        macros: &'s mut MacroTable<'ast>,
        sources: &'s mut SourceMap,
    ) -> Self {
        Self {
            lexer,
            pending: None,
            frames: Vec::new(),
            lookahead: VecDeque::with_capacity(4),
            macros,
            sources,
            error: None,
        }
    }

    /// The next expanded token, without consuming it.
    pub fn peek(&mut self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// The expanded token `n` positions ahead (0 = next).
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.pull();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    /// Consume and return the next expanded token.
    pub fn next(&mut self) -> Token<'ast> {
        match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.pull(),
        }
    }

    /// Consume the next token without expanding macros; used for macro bodies.
    pub fn next_unexpanded(&mut self) -> Token<'ast> {
        match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.raw_next(),
        }
    }

    pub fn define(&mut self, definition: Macro<'ast>) -> Result<(), ParseError> {
        self.macros.define(definition)
    }

    /// The error behind the first [`TokenKind::Error`] token, if any.
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    fn pull(&mut self) -> Token<'ast> {
        loop {
            let token = self.raw_next();
            if token.kind == TokenKind::Identifier
                && self.macros.contains(token.lexeme)
                && self.raw_peek().kind == TokenKind::LeftParen
            {
                if let Err(error) = self.expand(token) {
                    return self.fail(error);
                }
                continue;
            }
            return token;
        }
    }

    fn fail(&mut self, error: ParseError) -> Token<'ast> {
        let span = error.span;
        if self.error.is_none() {
            self.error = Some(error);
        }
        Token::new(TokenKind::Error, "", span)
    }

    fn error_token(&self) -> Option<Token<'ast>> {
        self.error
            .as_ref()
            .map(|e| Token::new(TokenKind::Error, "", e.span))
    }

    fn raw_next(&mut self) -> Token<'ast> {
        if let Some(token) = self.error_token() {
            return token;
        }
        while let Some(frame) = self.frames.last_mut() {
            if let Some(token) = frame.tokens.get(frame.pos) {
                frame.pos += 1;
                return *token;
            }
            self.frames.pop();
        }
        if let Some(token) = self.pending.take() {
            return token;
        }
        match self.lexer.next_token() {
            Ok(token) => token,
            Err(error) => self.fail(error),
        }
    }

    fn raw_peek(&mut self) -> Token<'ast> {
        if let Some(token) = self.error_token() {
            return token;
        }
        while let Some(frame) = self.frames.last() {
            if let Some(token) = frame.tokens.get(frame.pos) {
                return *token;
            }
            self.frames.pop();
        }
        if let Some(token) = self.pending {
            return token;
        }
        let token = match self.lexer.next_token() {
            Ok(token) => token,
            Err(error) => return self.fail(error),
        };
        self.pending = Some(token);
        token
    }

    fn expand(&mut self, invocation: Token<'ast>) -> Result<(), ParseError> {
        let Some(definition) = self.macros.get(invocation.lexeme).cloned() else {
            return Ok(());
        };

        let recursive = self
            .sources
            .expansion_trace(invocation.span)
            .iter()
            .any(|e| e.macro_name == definition.name);
        if recursive {
            return Err(ParseError::new(
                ParseErrorKind::RecursiveMacro,
                invocation.span,
                format!("macro {} expands to itself", definition.name),
            ));
        }

        // The '(' seen by raw_peek.
        self.raw_next();
        let args = self.collect_args(invocation)?;
        if args.len() != definition.params.len() {
            return Err(ParseError::new(
                ParseErrorKind::MacroArguments,
                invocation.span,
                format!(
                    "macro {} expects {} argument(s), got {}",
                    definition.name,
                    definition.params.len(),
                    args.len()
                ),
            ));
        }

        let expansion = self.sources.add_expansion(definition.name, invocation.span);
        let mut tokens = Vec::with_capacity(definition.body.len());
        for token in &definition.body {
            let param = (token.kind == TokenKind::Identifier)
                .then(|| definition.params.iter().position(|p| *p == token.lexeme))
                .flatten();
            match param {
                Some(index) => tokens.extend_from_slice(&args[index]),
                None => tokens.push(Token {
                    span: token.span.with_expansion(expansion),
                    ..*token
                }),
            }
        }
        tracing::trace!(name = definition.name, line = invocation.span.line, "expanding macro");
        self.frames.push(Frame { tokens, pos: 0 });
        Ok(())
    }

    /// Collect comma-separated arguments up to the closing parenthesis.
    fn collect_args(&mut self, invocation: Token<'ast>) -> Result<Vec<Vec<Token<'ast>>>, ParseError> {
        let mut args = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0u32;
        loop {
            let token = self.raw_next();
            match token.kind {
                TokenKind::Error => {
                    return Err(self.error.take().unwrap_or_else(|| {
                        ParseError::unexpected_eof(token.span)
                    }));
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::MacroArguments,
                        invocation.span,
                        format!("unterminated arguments to macro {}", invocation.lexeme),
                    ));
                }
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    depth += 1;
                    current.push(token);
                }
                TokenKind::RightParen if depth == 0 => {
                    if !(args.is_empty() && current.is_empty()) {
                        args.push(current);
                    }
                    return Ok(args);
                }
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                    current.push(token);
                }
                TokenKind::Comma if depth == 0 => args.push(std::mem::take(&mut current)),
                _ => current.push(token),
            }
        }
    }
}
