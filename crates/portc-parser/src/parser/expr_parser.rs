//! Expression parsing by precedence climbing.
//!
//! Assignment is right-associative and binds loosest, followed by the
//! conditional operator; binary operators take their binding power from
//! [`BinaryOp::precedence`]. Unary operators, casts and postfix operators
//! bind tighter than any binary operator.

use portc_core::{AssignOp, BinaryOp, IncDecOp, ParseError, ParseErrorKind, Span, UnaryOp};

use super::Parser;
use super::type_parser::primitive_type;
use crate::ast::*;
use crate::lexer::{Token, TokenKind};

/// Identifier that introduces an embedded binary resource.
const RESOURCE_KEYWORD: &str = "BinaryResource";

impl<'src, 'ast, 's> Parser<'src, 'ast, 's> {
    /// Parse a full expression, including assignments.
    pub(super) fn parse_expr(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let target = self.parse_ternary()?;
        let Some(op) = assign_op(self.peek().kind) else {
            return Ok(target);
        };
        self.advance();
        let value = self.parse_expr()?;
        let span = target.span().merge(value.span());
        Ok(self.alloc(Expr::Assign(self.alloc(AssignExpr {
            target,
            op,
            value,
            span,
        }))))
    }

    /// A variable or constant initializer: an expression or `{ a, b, ... }`.
    pub(super) fn parse_initializer(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let Some(open) = self.eat(TokenKind::LeftBrace) else {
            return self.parse_expr();
        };
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            elements.push(self.parse_initializer()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(self.alloc(Expr::InitList(InitListExpr {
            elements: self.alloc_slice(elements),
            span: open.span.merge(close.span),
        })))
    }

    fn parse_ternary(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let cond = self.parse_binary(1)?;
        if self.eat(TokenKind::Question).is_none() {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let else_expr = self.parse_ternary()?;
        let span = cond.span().merge(else_expr.span());
        Ok(self.alloc(Expr::Ternary(self.alloc(TernaryExpr {
            cond,
            then_expr,
            else_expr,
            span,
        }))))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_op(self.peek().kind) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = left.span().merge(right.span());
            left = self.alloc(Expr::Binary(self.alloc(BinaryExpr {
                left,
                op,
                right,
                span,
            })));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = self.peek();
        let unary = match token.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = unary {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(self.alloc(Expr::Unary(self.alloc(UnaryExpr {
                op,
                operand,
                span: token.span.merge(operand.span()),
            }))));
        }

        if matches!(token.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            self.advance();
            let operand = self.parse_unary()?;
            let op = if token.kind == TokenKind::PlusPlus {
                IncDecOp::PreInc
            } else {
                IncDecOp::PreDec
            };
            return Ok(self.alloc(Expr::IncDec(self.alloc(IncDecExpr {
                op,
                operand,
                span: token.span.merge(operand.span()),
            }))));
        }

        if token.kind == TokenKind::LeftParen && self.peek_nth(2).kind == TokenKind::RightParen {
            let target = primitive_type(self.peek_nth(1).kind);
            if let Some(target) = target.filter(|t| *t != PrimitiveType::Void) {
                self.advance();
                self.advance();
                self.advance();
                let operand = self.parse_unary()?;
                return Ok(self.alloc(Expr::Cast(self.alloc(CastExpr {
                    target,
                    operand,
                    span: token.span.merge(operand.span()),
                }))));
            }
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let token = self.peek();
            expr = match token.kind {
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident()?;
                    self.alloc(Expr::Member(self.alloc(MemberExpr {
                        object: expr,
                        member,
                        span: expr.span().merge(member.span),
                    })))
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let (args, close) = self.parse_arguments()?;
                    self.alloc(Expr::Call(self.alloc(CallExpr {
                        callee: expr,
                        args,
                        span: expr.span().merge(close),
                    })))
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let close = self.expect(TokenKind::RightBracket, "']'")?;
                    self.alloc(Expr::Index(self.alloc(IndexExpr {
                        object: expr,
                        index,
                        span: expr.span().merge(close.span),
                    })))
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.advance();
                    let op = if token.kind == TokenKind::PlusPlus {
                        IncDecOp::PostInc
                    } else {
                        IncDecOp::PostDec
                    };
                    self.alloc(Expr::IncDec(self.alloc(IncDecExpr {
                        op,
                        operand: expr,
                        span: expr.span().merge(token.span),
                    })))
                }
                _ => return Ok(expr),
            };
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn parse_arguments(&mut self) -> Result<(&'ast [&'ast Expr<'ast>], Span), ParseError> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RightParen, "')'")?;
        Ok((self.alloc_slice(args), close.span))
    }

    fn parse_primary(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = self.peek();
        let expr = match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                literal(LiteralKind::Int(parse_int(token)?), token.span)
            }
            TokenKind::CharLiteral => {
                self.advance();
                let decoded = decode_escapes(&token.lexeme[1..token.lexeme.len() - 1], token.span)?;
                let c = decoded.chars().next().unwrap_or('\0');
                literal(LiteralKind::Int(i64::from(u32::from(c))), token.span)
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let digits = token.lexeme.trim_end_matches(['f', 'F']);
                literal(LiteralKind::Float(parse_float(digits, token.span)?), token.span)
            }
            TokenKind::DoubleLiteral => {
                self.advance();
                literal(LiteralKind::Double(parse_float(token.lexeme, token.span)?), token.span)
            }
            TokenKind::StringLiteral => {
                self.advance();
                let decoded = decode_escapes(&token.lexeme[1..token.lexeme.len() - 1], token.span)?;
                literal(LiteralKind::String(self.arena.alloc_str(&decoded)), token.span)
            }
            TokenKind::True => {
                self.advance();
                literal(LiteralKind::Bool(true), token.span)
            }
            TokenKind::False => {
                self.advance();
                literal(LiteralKind::Bool(false), token.span)
            }
            TokenKind::Null => {
                self.advance();
                literal(LiteralKind::Null, token.span)
            }
            TokenKind::This => {
                self.advance();
                Expr::This(token.span)
            }
            TokenKind::Base => {
                self.advance();
                Expr::Base(token.span)
            }
            TokenKind::New => return self.parse_new(),
            TokenKind::Identifier
                if token.lexeme == RESOURCE_KEYWORD && self.peek_nth(1).kind == TokenKind::LeftParen =>
            {
                return self.parse_resource();
            }
            TokenKind::Identifier => {
                self.advance();
                Expr::Ident(Ident::new(token.lexeme, token.span))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RightParen, "')'")?;
                Expr::Paren(self.alloc(ParenExpr {
                    expr: inner,
                    span: token.span.merge(close.span),
                }))
            }
            TokenKind::Error | TokenKind::Eof => return Err(self.unexpected(token, "expression")),
            _ => return Err(ParseError::expected_expression(token.span, &token.describe())),
        };
        Ok(self.alloc(expr))
    }

    /// `new Name()` or `new T[length]`.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::New, "new")?;
        let base_span = self.peek().span;
        let base = self.parse_type_base()?;

        if let TypeBase::Named(name) = base
            && self.eat(TokenKind::LeftParen).is_some()
        {
            let close = self.expect(TokenKind::RightParen, "')': constructors take no arguments")?;
            return Ok(self.alloc(Expr::New(self.alloc(NewExpr {
                kind: NewKind::Object(name),
                span: start.span.merge(close.span),
            }))));
        }

        self.expect(TokenKind::LeftBracket, "'[' or '('")?;
        let len = self.parse_expr()?;
        let mut end = self.expect(TokenKind::RightBracket, "']'")?.span;

        let mut suffixes = Vec::new();
        while self.eat(TokenKind::LeftBracket).is_some() {
            let inner = self.parse_expr()?;
            end = self.expect(TokenKind::RightBracket, "']'")?.span;
            suffixes.push(ArraySuffix::Fixed(inner));
        }

        let elem = TypeExpr {
            is_const: false,
            base,
            suffixes: self.alloc_slice(suffixes),
            span: base_span,
        };
        Ok(self.alloc(Expr::New(self.alloc(NewExpr {
            kind: NewKind::Array { elem, len },
            span: start.span.merge(end),
        }))))
    }

    /// `BinaryResource("path")`
    fn parse_resource(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.advance();
        self.expect(TokenKind::LeftParen, "'('")?;
        let path = self.expect(TokenKind::StringLiteral, "resource path string")?;
        let close = self.expect(TokenKind::RightParen, "')'")?;
        let decoded = decode_escapes(&path.lexeme[1..path.lexeme.len() - 1], path.span)?;
        Ok(self.alloc(Expr::Resource(ResourceExpr {
            path: self.arena.alloc_str(&decoded),
            span: start.span.merge(close.span),
        })))
    }
}

fn literal(kind: LiteralKind<'_>, span: Span) -> Expr<'_> {
    Expr::Literal(LiteralExpr { kind, span })
}

fn parse_int(token: Token<'_>) -> Result<i64, ParseError> {
    let text = token.lexeme;
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse::<i64>(),
    };
    parsed.map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidLiteral,
            token.span,
            format!("integer literal {text} is out of range"),
        )
    })
}

fn parse_float(text: &str, span: Span) -> Result<f64, ParseError> {
    text.parse::<f64>().map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidLiteral,
            span,
            format!("invalid floating-point literal {text}"),
        )
    })
}

/// Decode the escapes of a string or character literal body.
fn decode_escapes(raw: &str, span: Span) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidEscapeSequence,
                    span,
                    format!("invalid escape sequence \\{}", other.map_or(String::new(), String::from)),
                ));
            }
        };
        out.push(escaped);
    }
    Ok(out)
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::EqualEqual => BinaryOp::Eq,
        TokenKind::BangEqual => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEqual => BinaryOp::Le,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::GreaterEqual => BinaryOp::Ge,
        TokenKind::LessLess => BinaryOp::Shl,
        TokenKind::GreaterGreater => BinaryOp::Shr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    };
    Some(op)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Equal => AssignOp::Assign,
        TokenKind::PlusEqual => AssignOp::Add,
        TokenKind::MinusEqual => AssignOp::Sub,
        TokenKind::StarEqual => AssignOp::Mul,
        TokenKind::SlashEqual => AssignOp::Div,
        TokenKind::PercentEqual => AssignOp::Mod,
        TokenKind::LessLessEqual => AssignOp::Shl,
        TokenKind::GreaterGreaterEqual => AssignOp::Shr,
        TokenKind::AmpEqual => AssignOp::BitAnd,
        TokenKind::PipeEqual => AssignOp::BitOr,
        TokenKind::CaretEqual => AssignOp::BitXor,
        _ => return None,
    };
    Some(op)
}
