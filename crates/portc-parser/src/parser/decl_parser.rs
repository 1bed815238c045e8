use portc_core::{ParseError, ParseErrorKind, Span};

use super::Parser;
use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::macros::Macro;

impl<'src, 'ast, 's> Parser<'src, 'ast, 's> {
    /// Parse a top-level class, enum or delegate declaration.
    pub(super) fn parse_item(&mut self) -> Result<Item<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers()?;
        let token = self.peek();
        match token.kind {
            TokenKind::Class => {
                check_allowed(
                    modifiers,
                    Modifiers::PUBLIC | Modifiers::ABSTRACT | Modifiers::STATIC,
                    start,
                    "class",
                )?;
                if modifiers.contains(Modifiers::ABSTRACT | Modifiers::STATIC) {
                    return Err(conflicting(start, "a class cannot be both abstract and static"));
                }
                Ok(Item::Class(self.parse_class(modifiers, start)?))
            }
            TokenKind::Enum => {
                check_allowed(modifiers, Modifiers::PUBLIC, start, "enum")?;
                Ok(Item::Enum(self.parse_enum(modifiers, start)?))
            }
            TokenKind::Delegate => {
                check_allowed(modifiers, Modifiers::PUBLIC, start, "delegate")?;
                Ok(Item::Delegate(self.parse_delegate(modifiers, start)?))
            }
            TokenKind::Error | TokenKind::Eof => Err(self.unexpected(token, "declaration")),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration,
                token.span,
                format!("expected class, enum or delegate, found {}", token.describe()),
            )),
        }
    }

    fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::empty();
        loop {
            let token = self.peek();
            let flag = match token.kind {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Protected => Modifiers::PROTECTED,
                TokenKind::Static => Modifiers::STATIC,
                TokenKind::Virtual => Modifiers::VIRTUAL,
                TokenKind::Override => Modifiers::OVERRIDE,
                TokenKind::Abstract => Modifiers::ABSTRACT,
                _ => break,
            };
            self.advance();
            if modifiers.contains(flag) {
                return Err(conflicting(
                    token.span,
                    &format!("duplicate modifier {}", flag.keyword()),
                ));
            }
            modifiers |= flag;
            if modifiers.intersection(Modifiers::VISIBILITY).bits().count_ones() > 1 {
                return Err(conflicting(token.span, "more than one visibility modifier"));
            }
        }
        Ok(modifiers)
    }

    /// `macro NAME(P1, P2) (expr)` or `macro NAME(P1, P2) { statements }`.
    ///
    /// Tokens are read unexpanded so bodies may mention other macros.
    pub(super) fn parse_macro_definition(&mut self) -> Result<(), ParseError> {
        let keyword = self.tokens.next_unexpanded();
        let name = self.next_unexpanded_kind(TokenKind::Identifier, "macro name")?;
        self.next_unexpanded_kind(TokenKind::LeftParen, "'('")?;

        let mut params = Vec::new();
        loop {
            let token = self.tokens.next_unexpanded();
            match token.kind {
                TokenKind::RightParen if params.is_empty() => break,
                TokenKind::Identifier => {
                    if params.contains(&token.lexeme) {
                        return Err(ParseError::new(
                            ParseErrorKind::MacroArguments,
                            token.span,
                            format!("duplicate macro parameter {}", token.lexeme),
                        ));
                    }
                    params.push(token.lexeme);
                    let separator = self.tokens.next_unexpanded();
                    match separator.kind {
                        TokenKind::Comma => {}
                        TokenKind::RightParen => break,
                        _ => return Err(self.unexpected(separator, "',' or ')'")),
                    }
                }
                _ => return Err(self.unexpected(token, "parameter name")),
            }
        }

        let open = self.tokens.next_unexpanded();
        if !matches!(open.kind, TokenKind::LeftParen | TokenKind::LeftBrace) {
            return Err(self.unexpected(open, "'(' or '{' starting the macro body"));
        }
        let mut body = vec![open];
        let mut depth = 1u32;
        while depth > 0 {
            let token = self.tokens.next_unexpanded();
            match token.kind {
                TokenKind::Eof | TokenKind::Error => {
                    return Err(self.unexpected(token, "end of macro body"));
                }
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => depth -= 1,
                _ => {}
            }
            body.push(token);
        }

        self.tokens.define(Macro {
            name: name.lexeme,
            params,
            body,
            span: keyword.span.merge(name.span),
        })
    }

    fn next_unexpanded_kind(&mut self, kind: TokenKind, what: &str) -> Result<Token<'ast>, ParseError> {
        let token = self.tokens.next_unexpanded();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(token, what))
        }
    }

    fn parse_class(
        &mut self,
        modifiers: Modifiers,
        start: Span,
    ) -> Result<&'ast ClassDecl<'ast>, ParseError> {
        self.expect(TokenKind::Class, "class")?;
        let name = self.expect_ident()?;
        let base = if self.eat(TokenKind::Colon).is_some() {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut members = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RightBrace => break,
                TokenKind::Macro => self.parse_macro_definition()?,
                _ => members.push(self.parse_class_member(name)?),
            }
        }
        let close = self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(self.alloc(ClassDecl {
            modifiers,
            name,
            base,
            members: self.alloc_slice(members),
            span: start.merge(close.span),
        }))
    }

    fn parse_class_member(&mut self, class_name: Ident<'ast>) -> Result<ClassMember<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers()?;

        if self.check(TokenKind::Const) {
            check_allowed(modifiers, Modifiers::VISIBILITY, start, "constant")?;
            return Ok(ClassMember::Const(self.parse_const_decl(modifiers, start)?));
        }

        let token = self.peek();
        if token.kind == TokenKind::Identifier
            && token.lexeme == class_name.name
            && self.peek_nth(1).kind == TokenKind::LeftParen
        {
            check_allowed(modifiers, Modifiers::VISIBILITY, start, "constructor")?;
            let name = self.expect_ident()?;
            self.expect(TokenKind::LeftParen, "'('")?;
            self.expect(TokenKind::RightParen, "')': constructors take no parameters")?;
            let body = self
                .parse_block()
                .map_err(|e| e.in_method(name.name))?;
            return Ok(ClassMember::Constructor(self.alloc(ConstructorDecl {
                modifiers,
                name,
                body,
                span: start.merge(body.span),
            })));
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        if !self.check(TokenKind::LeftParen) {
            check_allowed(modifiers, Modifiers::VISIBILITY, start, "field")?;
            let semi = self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(ClassMember::Field(self.alloc(FieldDecl {
                modifiers,
                ty,
                name,
                span: start.merge(semi.span),
            })));
        }

        let dispatch = modifiers.intersection(Modifiers::DISPATCH);
        if dispatch.bits().count_ones() > 1 {
            return Err(conflicting(start, "virtual, override and abstract are exclusive"));
        }
        if modifiers.contains(Modifiers::STATIC) && !dispatch.is_empty() {
            return Err(conflicting(start, "static methods cannot be virtual"));
        }

        let params = self.parse_params()?;
        let (body, end) = if modifiers.contains(Modifiers::ABSTRACT) {
            let semi = self.expect(TokenKind::Semicolon, "';' after abstract method")?;
            (None, semi.span)
        } else {
            let body = self.parse_block().map_err(|e| e.in_method(name.name))?;
            (Some(body), body.span)
        };

        Ok(ClassMember::Method(self.alloc(MethodDecl {
            modifiers,
            return_type: ty,
            name,
            params,
            body,
            span: start.merge(end),
        })))
    }

    /// `const T NAME = value;`, shared by class members and statements.
    pub(super) fn parse_const_decl(
        &mut self,
        modifiers: Modifiers,
        start: Span,
    ) -> Result<&'ast ConstDecl<'ast>, ParseError> {
        self.expect(TokenKind::Const, "const")?;
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Equal, "'=' and a constant value")?;
        let value = self.parse_initializer()?;
        let semi = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(self.alloc(ConstDecl {
            modifiers,
            ty,
            name,
            value,
            span: start.merge(semi.span),
        }))
    }

    fn parse_params(&mut self) -> Result<&'ast [Param<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RightParen).is_none() {
            loop {
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                params.push(Param {
                    ty,
                    name,
                    span: ty.span.merge(name.span),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "')'")?;
        }
        Ok(self.alloc_slice(params))
    }

    fn parse_enum(&mut self, modifiers: Modifiers, start: Span) -> Result<&'ast EnumDecl<'ast>, ParseError> {
        self.expect(TokenKind::Enum, "enum")?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut values = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let value_name = self.expect_ident()?;
            let value = if self.eat(TokenKind::Equal).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let span = value.map_or(value_name.span, |v| value_name.span.merge(v.span()));
            values.push(EnumValueDecl {
                name: value_name,
                value,
                span,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(self.alloc(EnumDecl {
            modifiers,
            name,
            values: self.alloc_slice(values),
            span: start.merge(close.span),
        }))
    }

    fn parse_delegate(
        &mut self,
        modifiers: Modifiers,
        start: Span,
    ) -> Result<&'ast DelegateDecl<'ast>, ParseError> {
        self.expect(TokenKind::Delegate, "delegate")?;
        let return_type = self.parse_type()?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let semi = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(self.alloc(DelegateDecl {
            modifiers,
            return_type,
            name,
            params,
            span: start.merge(semi.span),
        }))
    }
}

fn check_allowed(modifiers: Modifiers, allowed: Modifiers, span: Span, what: &str) -> Result<(), ParseError> {
    let invalid = modifiers.difference(allowed);
    if invalid.is_empty() {
        return Ok(());
    }
    let first = invalid
        .iter()
        .next()
        .map_or("modifier", |flag| flag.keyword());
    Err(ParseError::new(
        ParseErrorKind::InvalidModifier,
        span,
        format!("{first} is not allowed on a {what}"),
    ))
}

fn conflicting(span: Span, message: &str) -> ParseError {
    ParseError::new(ParseErrorKind::ConflictingModifiers, span, message)
}
