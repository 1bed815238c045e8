//! Converts preprocessed source text into tokens.
//!
//! Lexemes are copied into the arena so the source text can be dropped once
//! lexing completes.

use bumpalo::Bump;
use portc_core::{ParseError, ParseErrorKind, SourceId, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for one source file.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    source: SourceId,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(text: &'src str, source: SourceId, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(text),
            arena,
            source,
        }
    }

    /// Scan the next token; returns an `Eof` token at the end of input.
    pub fn next_token(&mut self) -> Result<Token<'ast>, ParseError> {
        self.skip_trivia()?;

        if self.cursor.is_eof() {
            let span = Span::in_source(self.source, self.cursor.line(), self.cursor.column(), 0);
            return Ok(Token::new(TokenKind::Eof, "", span));
        }

        let start = Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        };

        match self.cursor.peek() {
            Some('"') => self.scan_string(start),
            Some('\'') => self.scan_char(start),
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some(c) if is_ident_start(c) => Ok(self.scan_identifier(start)),
            _ => self.scan_operator(start),
        }
    }

    fn span_from(&self, start: Start) -> Span {
        Span::in_source(
            self.source,
            start.line,
            start.col,
            self.cursor.offset() - start.offset,
        )
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.span_from(start))
    }

    fn error(&self, kind: ParseErrorKind, start: Start, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, self.span_from(start), message)
    }

    /// Skip whitespace, line comments and block comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace() || c == '\u{FEFF}');
            match (self.cursor.peek(), self.cursor.peek_nth(1)) {
                (Some('/'), Some('/')) => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    let start = Start {
                        line: self.cursor.line(),
                        col: self.cursor.column(),
                        offset: self.cursor.offset(),
                    };
                    self.cursor.advance();
                    self.cursor.advance();
                    loop {
                        match self.cursor.advance() {
                            None => {
                                return Err(self.error(
                                    ParseErrorKind::UnterminatedComment,
                                    start,
                                    "unterminated comment",
                                ));
                            }
                            Some('*') if self.cursor.eat('/') => break,
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_string(&mut self, start: Start) -> Result<Token<'ast>, ParseError> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Err(self.error(
                        ParseErrorKind::UnterminatedString,
                        start,
                        "unterminated string",
                    ));
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('"') => {
                    self.cursor.advance();
                    return Ok(self.make_token(TokenKind::StringLiteral, start));
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_char(&mut self, start: Start) -> Result<Token<'ast>, ParseError> {
        self.cursor.advance();
        if self.cursor.eat('\\') {
            self.cursor.advance();
        } else if self.cursor.peek().is_none_or(|c| c == '\'' || c == '\n') {
            return Err(self.error(ParseErrorKind::InvalidLiteral, start, "empty character literal"));
        } else {
            self.cursor.advance();
        }
        if !self.cursor.eat('\'') {
            return Err(self.error(
                ParseErrorKind::UnterminatedString,
                start,
                "unterminated character literal",
            ));
        }
        Ok(self.make_token(TokenKind::CharLiteral, start))
    }

    fn scan_number(&mut self, start: Start) -> Result<Token<'ast>, ParseError> {
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_nth(1), Some('x' | 'X')) {
            self.cursor.advance();
            self.cursor.advance();
            let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                return Err(self.error(
                    ParseErrorKind::InvalidLiteral,
                    start,
                    "expected hexadecimal digits",
                ));
            }
            return Ok(self.make_token(TokenKind::IntLiteral, start));
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_floating = false;

        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_floating = true;
        }

        if let Some('e' | 'E') = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(self.error(ParseErrorKind::InvalidLiteral, start, "expected exponent digits"));
            }
            is_floating = true;
        }

        if let Some('f' | 'F') = self.cursor.peek() {
            self.cursor.advance();
            return Ok(self.make_token(TokenKind::FloatLiteral, start));
        }

        if self.cursor.check(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            return Err(self.error(ParseErrorKind::InvalidLiteral, start, "invalid numeric literal"));
        }

        let kind = if is_floating {
            TokenKind::DoubleLiteral
        } else {
            TokenKind::IntLiteral
        };
        Ok(self.make_token(kind, start))
    }

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    fn scan_operator(&mut self, start: Start) -> Result<Token<'ast>, ParseError> {
        let Some(c) = self.cursor.advance() else {
            return Err(ParseError::unexpected_eof(self.span_from(start)));
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (';', _) => TokenKind::Semicolon,
            (',', _) => TokenKind::Comma,
            ('.', _) => TokenKind::Dot,
            (':', _) => TokenKind::Colon,
            ('?', _) => TokenKind::Question,
            ('~', _) => TokenKind::Tilde,

            ('+', Some('+')) => self.take(TokenKind::PlusPlus),
            ('+', Some('=')) => self.take(TokenKind::PlusEqual),
            ('+', _) => TokenKind::Plus,

            ('-', Some('-')) => self.take(TokenKind::MinusMinus),
            ('-', Some('=')) => self.take(TokenKind::MinusEqual),
            ('-', _) => TokenKind::Minus,

            ('*', Some('=')) => self.take(TokenKind::StarEqual),
            ('*', _) => TokenKind::Star,
            ('/', Some('=')) => self.take(TokenKind::SlashEqual),
            ('/', _) => TokenKind::Slash,
            ('%', Some('=')) => self.take(TokenKind::PercentEqual),
            ('%', _) => TokenKind::Percent,

            ('=', Some('=')) => self.take(TokenKind::EqualEqual),
            ('=', _) => TokenKind::Equal,
            ('!', Some('=')) => self.take(TokenKind::BangEqual),
            ('!', _) => TokenKind::Bang,

            ('<', Some('=')) => self.take(TokenKind::LessEqual),
            ('<', Some('<')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::LessLessEqual
                } else {
                    TokenKind::LessLess
                }
            }
            ('<', _) => TokenKind::Less,

            ('>', Some('=')) => self.take(TokenKind::GreaterEqual),
            ('>', Some('>')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::GreaterGreaterEqual
                } else {
                    TokenKind::GreaterGreater
                }
            }
            ('>', _) => TokenKind::Greater,

            ('&', Some('&')) => self.take(TokenKind::AmpAmp),
            ('&', Some('=')) => self.take(TokenKind::AmpEqual),
            ('&', _) => TokenKind::Amp,
            ('|', Some('|')) => self.take(TokenKind::PipePipe),
            ('|', Some('=')) => self.take(TokenKind::PipeEqual),
            ('|', _) => TokenKind::Pipe,
            ('^', Some('=')) => self.take(TokenKind::CaretEqual),
            ('^', _) => TokenKind::Caret,

            _ => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedChar,
                    start,
                    format!("unexpected character '{c}'"),
                ));
            }
        };

        Ok(self.make_token(kind, start))
    }

    /// Consume the second character of a two-character operator.
    fn take(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }
}

#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
        let arena = Bump::new();
        let mut lexer = Lexer::new(source, SourceId(0), &arena);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push((token.kind, token.lexeme.to_string()));
        }
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|(k, _)| k).collect()
    }

    fn lex_error(source: &str) -> ParseError {
        let arena = Bump::new();
        let mut lexer = Lexer::new(source, SourceId(0), &arena);
        loop {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::Eof => panic!("expected a lex error"),
                Ok(_) => {}
                Err(e) => return e,
            }
        }
    }

    #[test]
    fn empty_source() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("class Shape : Base"),
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            kinds("42 0xFF 1.5 2e3 1.5f"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral
            ]
        );
    }

    #[test]
    fn string_and_char_literals() {
        let tokens = tokenize(r#""a\"b" 'x' '\n'"#);
        assert_eq!(tokens[0], (TokenKind::StringLiteral, r#""a\"b""#.to_string()));
        assert_eq!(tokens[1].0, TokenKind::CharLiteral);
        assert_eq!(tokens[2].0, TokenKind::CharLiteral);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // line\n /* block\n */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn compound_operators() {
        assert_eq!(
            kinds("<<= >>= << >> <= >= && || ++ -- != =="),
            vec![
                TokenKind::LessLessEqual,
                TokenKind::GreaterGreaterEqual,
                TokenKind::LessLess,
                TokenKind::GreaterGreater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::BangEqual,
                TokenKind::EqualEqual
            ]
        );
    }

    #[test]
    fn spans_track_position() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a\n  bc", SourceId(3), &arena);
        lexer.next_token().unwrap();
        let token = lexer.next_token().unwrap();
        assert_eq!(token.span.source, SourceId(3));
        assert_eq!((token.span.line, token.span.col, token.span.len), (2, 3, 2));
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(lex_error("\"abc\n\"").kind, ParseErrorKind::UnterminatedString);
    }

    #[test]
    fn unterminated_comment_is_error() {
        assert_eq!(lex_error("a /* b").kind, ParseErrorKind::UnterminatedComment);
    }

    #[test]
    fn unexpected_character_is_error() {
        let err = lex_error("a @ b");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedChar);
        assert_eq!(err.span.col, 3);
    }

    #[test]
    fn identifier_glued_to_number_is_error() {
        assert_eq!(lex_error("12abc").kind, ParseErrorKind::InvalidLiteral);
    }
}
