use portc_core::{ParseError, ParseErrorKind};

use super::Parser;
use crate::ast::{ArraySuffix, Ident, PrimitiveType, TypeBase, TypeExpr};
use crate::lexer::TokenKind;

impl<'src, 'ast, 's> Parser<'src, 'ast, 's> {
    /// Parse a type: `[const] base ('[' [length] ']')*`.
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let start = self.peek().span;
        let is_const = self.eat(TokenKind::Const).is_some();
        let base = self.parse_type_base()?;

        let mut suffixes = Vec::new();
        let mut span = start;
        while self.check(TokenKind::LeftBracket) {
            self.advance();
            if let Some(close) = self.eat(TokenKind::RightBracket) {
                suffixes.push(ArraySuffix::Open);
                span = span.merge(close.span);
            } else {
                let len = self.parse_expr()?;
                let close = self.expect(TokenKind::RightBracket, "']'")?;
                suffixes.push(ArraySuffix::Fixed(len));
                span = span.merge(close.span);
            }
        }

        if is_const && !matches!(suffixes.first(), Some(ArraySuffix::Open)) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidModifier,
                start,
                "const applies only to array references",
            ));
        }

        Ok(TypeExpr {
            is_const,
            base,
            suffixes: self.alloc_slice(suffixes),
            span,
        })
    }

    pub(super) fn parse_type_base(&mut self) -> Result<TypeBase<'ast>, ParseError> {
        let token = self.peek();
        if let Some(primitive) = primitive_type(token.kind) {
            self.advance();
            return Ok(TypeBase::Primitive(primitive));
        }
        if token.kind == TokenKind::Identifier {
            self.advance();
            return Ok(TypeBase::Named(Ident::new(token.lexeme, token.span)));
        }
        if matches!(token.kind, TokenKind::Error | TokenKind::Eof) {
            return Err(self.unexpected(token, "type"));
        }
        Err(ParseError::expected_type(token.span, &token.describe()))
    }
}

pub(super) fn primitive_type(kind: TokenKind) -> Option<PrimitiveType> {
    let ty = match kind {
        TokenKind::Void => PrimitiveType::Void,
        TokenKind::Bool => PrimitiveType::Bool,
        TokenKind::Byte => PrimitiveType::Byte,
        TokenKind::Int => PrimitiveType::Int,
        TokenKind::Long => PrimitiveType::Long,
        TokenKind::Float => PrimitiveType::Float,
        TokenKind::Double => PrimitiveType::Double,
        TokenKind::String => PrimitiveType::String,
        _ => return None,
    };
    Some(ty)
}
