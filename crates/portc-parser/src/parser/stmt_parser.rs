use portc_core::{ParseError, ParseErrorKind};

use super::Parser;
use crate::ast::*;
use crate::lexer::TokenKind;

impl<'src, 'ast, 's> Parser<'src, 'ast, 's> {
    /// `{ statement* }`
    pub(super) fn parse_block(&mut self) -> Result<&'ast Block<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace, "'{'")?;
        let mut stmts = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RightBrace => break,
                // Stray semicolons, typically left behind by macro invocations.
                TokenKind::Semicolon => {
                    self.advance();
                }
                _ => stmts.push(self.parse_statement()?),
            }
        }
        let close = self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(self.alloc(Block {
            stmts: self.alloc_slice(stmts),
            span: open.span.merge(close.span),
        }))
    }

    pub(super) fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Block(self.alloc(Block {
                    stmts: &[],
                    span: token.span,
                })))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break => {
                self.advance();
                let semi = self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Break(token.span.merge(semi.span)))
            }
            TokenKind::Continue => {
                self.advance();
                let semi = self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Continue(token.span.merge(semi.span)))
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let semi = self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Return(ReturnStmt {
                    value,
                    span: token.span.merge(semi.span),
                }))
            }
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Throw(ThrowStmt {
                    value,
                    span: token.span.merge(semi.span),
                }))
            }
            TokenKind::Const => self.parse_local_const(),
            TokenKind::Class | TokenKind::Enum | TokenKind::Delegate => Err(ParseError::new(
                ParseErrorKind::ExpectedStatement,
                token.span,
                format!("{} declarations are not allowed inside methods", token.lexeme),
            )),
            _ if self.is_declaration_start() => Ok(Stmt::VarDecl(self.parse_var_decl()?)),
            _ => self.parse_expr_statement(),
        }
    }

    /// Whether the next tokens begin `T name` with `T` a primitive, a named
    /// type or an array of either.
    fn is_declaration_start(&mut self) -> bool {
        let first = self.peek().kind;
        if first.is_primitive_type() {
            // `(int) x` casts are parsed as expressions, never here.
            return true;
        }
        if first != TokenKind::Identifier {
            return false;
        }
        let mut n = 1;
        loop {
            match self.peek_nth(n).kind {
                TokenKind::Identifier => return true,
                TokenKind::LeftBracket => {
                    let mut depth = 0usize;
                    loop {
                        match self.peek_nth(n).kind {
                            TokenKind::LeftBracket => depth += 1,
                            TokenKind::RightBracket => {
                                depth -= 1;
                                if depth == 0 {
                                    n += 1;
                                    break;
                                }
                            }
                            TokenKind::Eof | TokenKind::Error | TokenKind::Semicolon => return false,
                            _ => {}
                        }
                        n += 1;
                    }
                }
                _ => return false,
            }
        }
    }

    /// `const T NAME = value;` in a method body.
    ///
    /// `const T[] name = expr;` with anything but an initializer list declares
    /// a read-only array reference instead of a named constant.
    fn parse_local_const(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.peek().span;
        let decl = self.parse_const_decl(Modifiers::empty(), start)?;
        let is_array_ref = matches!(decl.ty.suffixes.first(), Some(ArraySuffix::Open));
        if is_array_ref && !matches!(decl.value, Expr::InitList(_)) {
            return Ok(Stmt::VarDecl(self.alloc(VarDeclStmt {
                ty: TypeExpr {
                    is_const: true,
                    span: start.merge(decl.ty.span),
                    ..decl.ty
                },
                name: decl.name,
                init: Some(decl.value),
                span: decl.span,
            })));
        }
        Ok(Stmt::ConstDecl(decl))
    }

    fn parse_var_decl(&mut self) -> Result<&'ast VarDeclStmt<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let init = if self.eat(TokenKind::Equal).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(self.alloc(VarDeclStmt {
            ty,
            name,
            init,
            span: ty.span.merge(semi.span),
        }))
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expr()?;
        let semi = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: expr.span().merge(semi.span),
        }))
    }

    fn parse_condition(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(cond)
    }

    fn parse_body(&mut self) -> Result<&'ast Stmt<'ast>, ParseError> {
        let stmt = self.parse_statement()?;
        Ok(self.alloc(stmt))
    }

    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::If, "if")?;
        let cond = self.parse_condition()?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_body()?)
        } else {
            None
        };
        let end = else_branch.map_or(then_branch.span(), |s| s.span());
        Ok(Stmt::If(self.alloc(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.span.merge(end),
        })))
    }

    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::While, "while")?;
        let cond = self.parse_condition()?;
        let body = self.parse_body()?;
        Ok(Stmt::While(self.alloc(WhileStmt {
            cond,
            body,
            span: start.span.merge(body.span()),
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Do, "do")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::While, "while")?;
        let cond = self.parse_condition()?;
        let semi = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::DoWhile(self.alloc(DoWhileStmt {
            body,
            cond,
            span: start.span.merge(semi.span),
        })))
    }

    fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::For, "for")?;
        self.expect(TokenKind::LeftParen, "'('")?;

        let init = if self.eat(TokenKind::Semicolon).is_some() {
            None
        } else if self.is_declaration_start() {
            let decl = self.parse_var_decl()?;
            Some(self.alloc(Stmt::VarDecl(decl)))
        } else {
            let stmt = self.parse_expr_statement()?;
            Some(self.alloc(stmt))
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let step = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, "')'")?;

        let body = self.parse_body()?;
        Ok(Stmt::For(self.alloc(ForStmt {
            init,
            cond,
            step,
            body,
            span: start.span.merge(body.span()),
        })))
    }

    fn parse_switch(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Switch, "switch")?;
        let value = self.parse_condition()?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let section_start = self.peek().span;
            let mut labels = Vec::new();
            let mut is_default = false;
            loop {
                if self.eat(TokenKind::Case).is_some() {
                    labels.push(self.parse_expr()?);
                    self.expect(TokenKind::Colon, "':'")?;
                } else if self.eat(TokenKind::Default).is_some() {
                    is_default = true;
                    self.expect(TokenKind::Colon, "':'")?;
                } else {
                    break;
                }
            }
            if labels.is_empty() && !is_default {
                let token = self.peek();
                return Err(self.unexpected(token, "case or default"));
            }

            let mut body = Vec::new();
            let mut span = section_start;
            while !matches!(
                self.peek().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace
            ) {
                if self.eat(TokenKind::Semicolon).is_some() {
                    continue;
                }
                let stmt = self.parse_statement()?;
                span = span.merge(stmt.span());
                body.push(stmt);
            }
            cases.push(SwitchCase {
                labels: self.alloc_slice(labels),
                is_default,
                body: self.alloc_slice(body),
                span,
            });
        }
        let close = self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(Stmt::Switch(self.alloc(SwitchStmt {
            value,
            cases: self.alloc_slice(cases),
            span: start.span.merge(close.span),
        })))
    }
}
