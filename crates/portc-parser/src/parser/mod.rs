//! Recursive-descent parser over the expanded token stream.

mod decl_parser;
mod expr_parser;
mod stmt_parser;
mod type_parser;

use bumpalo::Bump;
use portc_core::{ParseError, SourceId};

use crate::ast::{Ident, Script};
use crate::lexer::{Token, TokenKind};
use crate::macros::TokenStream;

/// Parses one source file into a [`Script`].
pub struct Parser<'src, 'ast, 's> {
    arena: &'ast Bump,
    tokens: TokenStream<'src, 'ast, 's>,
    source: SourceId,
}

impl<'src, 'ast, 's> Parser<'src, 'ast, 's> {
    pub fn new(arena: &'ast Bump, tokens: TokenStream<'src, 'ast, 's>, source: SourceId) -> Self {
        Self {
            arena,
            tokens,
            source,
        }
    }

    /// Parse every declaration until the end of the file.
    pub fn parse_script(mut self) -> Result<Script<'ast>, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Macro => self.parse_macro_definition()?,
                _ => items.push(self.parse_item()?),
            }
        }
        Ok(Script::new(self.alloc_slice(items), self.source))
    }

    // =========================================
    // Token helpers
    // =========================================

    #[inline]
    fn peek(&mut self) -> Token<'ast> {
        self.tokens.peek()
    }

    #[inline]
    fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        self.tokens.peek_nth(n)
    }

    #[inline]
    fn advance(&mut self) -> Token<'ast> {
        self.tokens.next()
    }

    #[inline]
    fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(token, what))
        }
    }

    fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else if matches!(token.kind, TokenKind::Error | TokenKind::Eof) {
            Err(self.unexpected(token, "identifier"))
        } else {
            Err(ParseError::expected_identifier(token.span, &token.describe()))
        }
    }

    /// Error for `token` appearing where `expected` was required.
    fn unexpected(&mut self, token: Token<'ast>, expected: &str) -> ParseError {
        match token.kind {
            TokenKind::Error => self
                .tokens
                .take_error()
                .unwrap_or_else(|| ParseError::unexpected_token(token.span, "invalid token")),
            TokenKind::Eof => ParseError::unexpected_eof(token.span),
            _ => ParseError::expected_token(token.span, expected, &token.describe()),
        }
    }

    #[inline]
    fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    #[inline]
    fn alloc_slice<T: Copy>(&self, values: Vec<T>) -> &'ast [T] {
        self.arena.alloc_slice_copy(&values)
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use portc_core::{BinaryOp, DefineSet, IncDecOp, ParseError, ParseErrorKind, UnaryOp};

    use crate::ast::*;
    use crate::session::ParseSession;

    fn parse<'ast>(arena: &'ast Bump, source: &str) -> Result<Script<'ast>, ParseError> {
        ParseSession::new(arena, DefineSet::new()).parse_file("test.pc", source)
    }

    fn parse_err(source: &str) -> ParseError {
        let arena = Bump::new();
        match parse(&arena, source) {
            Ok(script) => panic!("expected error, parsed {:?}", script.items()),
            Err(e) => e,
        }
    }

    fn class<'ast>(script: &Script<'ast>, index: usize) -> &'ast ClassDecl<'ast> {
        match script.items()[index] {
            Item::Class(c) => c,
            other => panic!("expected class, got {other:?}"),
        }
    }

    fn method<'ast>(class: &'ast ClassDecl<'ast>, index: usize) -> &'ast MethodDecl<'ast> {
        match class.members[index] {
            ClassMember::Method(m) => m,
            other => panic!("expected method, got {other:?}"),
        }
    }

    /// Statements of `void M() { <body> }`.
    fn body<'ast>(arena: &'ast Bump, statements: &str) -> &'ast [Stmt<'ast>] {
        let source = format!("class T {{ void M() {{ {statements} }} }}");
        let script = parse(arena, &source).unwrap();
        method(class(&script, 0), 0).body.unwrap().stmts
    }

    fn expr<'ast>(arena: &'ast Bump, text: &str) -> &'ast Expr<'ast> {
        match body(arena, &format!("{text};"))[0] {
            Stmt::Expr(s) => s.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn class_with_members() {
        let arena = Bump::new();
        let script = parse(
            &arena,
            "public abstract class Shape : Base {
                const int SIDES = 4;
                protected int count;
                Shape() { count = 0; }
                public abstract int Area();
                public static void Reset(int a, const byte[] b) { }
            }",
        )
        .unwrap();
        let shape = class(&script, 0);
        assert_eq!(shape.name.name, "Shape");
        assert_eq!(shape.base.map(|b| b.name), Some("Base"));
        assert!(shape.modifiers.contains(Modifiers::PUBLIC | Modifiers::ABSTRACT));
        assert_eq!(shape.members.len(), 5);
        assert!(matches!(shape.members[0], ClassMember::Const(c) if c.name.name == "SIDES"));
        assert!(matches!(shape.members[1], ClassMember::Field(f) if f.modifiers == Modifiers::PROTECTED));
        assert!(matches!(shape.members[2], ClassMember::Constructor(_)));
        let area = method(shape, 3);
        assert!(area.body.is_none());
        let reset = method(shape, 4);
        assert_eq!(reset.params.len(), 2);
        assert!(reset.params[1].ty.is_const);
    }

    #[test]
    fn enum_and_delegate() {
        let arena = Bump::new();
        let script = parse(
            &arena,
            "enum Color { Red, Green = 5, Blue, }
             public delegate int Compare(int a, int b);",
        )
        .unwrap();
        let Item::Enum(color) = script.items()[0] else {
            panic!("expected enum");
        };
        assert_eq!(color.values.len(), 3);
        assert!(color.values[0].value.is_none());
        assert!(color.values[1].value.is_some());
        let Item::Delegate(compare) = script.items()[1] else {
            panic!("expected delegate");
        };
        assert_eq!(compare.params.len(), 2);
        assert!(compare.modifiers.contains(Modifiers::PUBLIC));
    }

    #[test]
    fn fixed_and_nested_array_types() {
        let arena = Bump::new();
        let script = parse(&arena, "class T { int[3][4] grid; byte[] data; }").unwrap();
        let ClassMember::Field(grid) = class(&script, 0).members[0] else {
            panic!("expected field");
        };
        assert_eq!(grid.ty.suffixes.len(), 2);
        assert!(matches!(grid.ty.suffixes[0], ArraySuffix::Fixed(_)));
        let ClassMember::Field(data) = class(&script, 0).members[1] else {
            panic!("expected field");
        };
        assert_eq!(data.ty.suffixes, &[ArraySuffix::Open]);
    }

    #[test]
    fn precedence_climbing() {
        let arena = Bump::new();
        let Expr::Binary(add) = expr(&arena, "1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(add.op, BinaryOp::Add);
        assert!(matches!(add.right, Expr::Binary(mul) if mul.op == BinaryOp::Mul));

        let Expr::Binary(sub) = expr(&arena, "10 - 4 - 3") else {
            panic!("expected binary");
        };
        assert!(matches!(sub.left, Expr::Binary(inner) if inner.op == BinaryOp::Sub));

        let Expr::Binary(or) = expr(&arena, "a && b || c == d") else {
            panic!("expected binary");
        };
        assert_eq!(or.op, BinaryOp::Or);
    }

    #[test]
    fn assignment_is_right_associative() {
        let arena = Bump::new();
        let Expr::Assign(outer) = expr(&arena, "a = b += 2") else {
            panic!("expected assignment");
        };
        assert!(matches!(outer.value, Expr::Assign(inner) if inner.op == portc_core::AssignOp::Add));
    }

    #[test]
    fn unary_cast_and_postfix() {
        let arena = Bump::new();
        assert!(matches!(expr(&arena, "-x"), Expr::Unary(u) if u.op == UnaryOp::Neg));
        assert!(matches!(expr(&arena, "~x"), Expr::Unary(u) if u.op == UnaryOp::BitNot));
        assert!(matches!(expr(&arena, "i++"), Expr::IncDec(e) if e.op == IncDecOp::PostInc));
        assert!(matches!(expr(&arena, "--i"), Expr::IncDec(e) if e.op == IncDecOp::PreDec));
        assert!(matches!(
            expr(&arena, "(byte) (x + 1)"),
            Expr::Cast(c) if c.target == PrimitiveType::Byte
        ));
        assert!(matches!(expr(&arena, "(x)"), Expr::Paren(_)));
        let Expr::Call(call) = expr(&arena, "items[2].Draw(1, 2)") else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 2);
        assert!(matches!(call.callee, Expr::Member(m) if m.member.name == "Draw"));
    }

    #[test]
    fn literals() {
        let arena = Bump::new();
        assert!(matches!(expr(&arena, "0x1F"), Expr::Literal(l) if l.kind == LiteralKind::Int(31)));
        assert!(matches!(expr(&arena, "'A'"), Expr::Literal(l) if l.kind == LiteralKind::Int(65)));
        assert!(matches!(expr(&arena, "1.5f"), Expr::Literal(l) if l.kind == LiteralKind::Float(1.5)));
        assert!(matches!(expr(&arena, "2.5"), Expr::Literal(l) if l.kind == LiteralKind::Double(2.5)));
        assert!(matches!(
            expr(&arena, r#""a\tb""#),
            Expr::Literal(l) if l.kind == LiteralKind::String("a\tb")
        ));
    }

    #[test]
    fn new_and_resource_expressions() {
        let arena = Bump::new();
        assert!(matches!(
            expr(&arena, "new Circle()"),
            Expr::New(n) if matches!(n.kind, NewKind::Object(name) if name.name == "Circle")
        ));
        assert!(matches!(
            expr(&arena, "new int[n]"),
            Expr::New(n) if matches!(n.kind, NewKind::Array { .. })
        ));
        assert!(matches!(
            expr(&arena, r#"BinaryResource("font.bin")"#),
            Expr::Resource(r) if r.path == "font.bin"
        ));
    }

    #[test]
    fn statements() {
        let arena = Bump::new();
        let stmts = body(
            &arena,
            "int x = 1;
             Shape[] shapes;
             const int LIMIT = 10;
             const byte[] table = data;
             for (int i = 0; i < LIMIT; i++) { x += i; }
             while (true) break;
             do { x--; } while (x > 0);
             if (x == 0) return; else throw \"bad\";",
        );
        assert!(matches!(stmts[0], Stmt::VarDecl(v) if v.init.is_some()));
        assert!(matches!(stmts[1], Stmt::VarDecl(v) if v.name.name == "shapes"));
        assert!(matches!(stmts[2], Stmt::ConstDecl(_)));
        assert!(matches!(stmts[3], Stmt::VarDecl(v) if v.ty.is_const));
        assert!(matches!(stmts[4], Stmt::For(f) if f.init.is_some() && f.step.is_some()));
        assert!(matches!(stmts[5], Stmt::While(_)));
        assert!(matches!(stmts[6], Stmt::DoWhile(_)));
        assert!(matches!(stmts[7], Stmt::If(i) if i.else_branch.is_some()));
    }

    #[test]
    fn switch_groups_labels() {
        let arena = Bump::new();
        let stmts = body(
            &arena,
            "switch (x) { case 1: case 2: y = 1; break; default: return; }",
        );
        let Stmt::Switch(switch) = stmts[0] else {
            panic!("expected switch");
        };
        assert_eq!(switch.cases.len(), 2);
        assert_eq!(switch.cases[0].labels.len(), 2);
        assert_eq!(switch.cases[0].body.len(), 2);
        assert!(switch.cases[1].is_default);
    }

    #[test]
    fn macros_expand_in_expressions_and_statements() {
        let arena = Bump::new();
        let script = parse(
            &arena,
            "macro SQR(X) ((X) * (X))
             class T {
                 macro CLEAR(V) { V = 0; }
                 int M(int a) { CLEAR(a); return SQR(a + 1); }
             }",
        )
        .unwrap();
        let stmts = method(class(&script, 0), 0).body.unwrap().stmts;
        assert!(matches!(stmts[0], Stmt::Block(b) if b.stmts.len() == 1));
        let Stmt::Return(ret) = stmts[1] else {
            panic!("expected return");
        };
        let value = ret.value.unwrap().unparenthesized();
        assert!(matches!(value, Expr::Binary(b) if b.op == BinaryOp::Mul));
        assert!(value.span().expansion.is_some());
    }

    #[test]
    fn conditional_compilation_selects_declarations() {
        let arena = Bump::new();
        let defines = DefineSet::with_symbols(["FAST"]).unwrap();
        let mut session = ParseSession::new(&arena, defines);
        let script = session
            .parse_file(
                "test.pc",
                "#if FAST\nclass Fast { }\n#else\nclass Slow { }\n#endif\n",
            )
            .unwrap();
        assert_eq!(script.items().len(), 1);
        assert_eq!(script.items()[0].name().name, "Fast");
        assert_eq!(script.items()[0].span().line, 2);
    }

    #[test]
    fn modifier_errors() {
        assert_eq!(
            parse_err("static abstract class A { }").kind,
            ParseErrorKind::ConflictingModifiers
        );
        assert_eq!(
            parse_err("public public class A { }").kind,
            ParseErrorKind::ConflictingModifiers
        );
        assert_eq!(parse_err("virtual enum E { A }").kind, ParseErrorKind::InvalidModifier);
        assert_eq!(
            parse_err("class A { static virtual void M() { } }").kind,
            ParseErrorKind::ConflictingModifiers
        );
        assert_eq!(
            parse_err("class A { virtual int x; }").kind,
            ParseErrorKind::InvalidModifier
        );
    }

    #[test]
    fn syntax_errors_carry_position_and_method() {
        let error = parse_err("class A {\n void M() {\n  x = ;\n }\n}");
        assert_eq!(error.kind, ParseErrorKind::ExpectedExpression);
        assert_eq!(error.span.line, 3);
        assert_eq!(error.method.as_deref(), Some("M"));

        assert_eq!(parse_err("class A {").kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(
            parse_err("class A { void M() { string s = \"\\q\"; } }").kind,
            ParseErrorKind::InvalidEscapeSequence
        );
        assert_eq!(
            parse_err("class A { long M() { return 99999999999999999999; } }").kind,
            ParseErrorKind::InvalidLiteral
        );
    }

    #[test]
    fn macro_errors() {
        assert_eq!(
            parse_err("macro M(A) (A)\nclass T { int F() { return M(1, 2); } }").kind,
            ParseErrorKind::MacroArguments
        );
        assert_eq!(
            parse_err("macro M(A) (M(A))\nclass T { int F() { return M(1); } }").kind,
            ParseErrorKind::RecursiveMacro
        );
        assert_eq!(
            parse_err("macro M(A) (A\nclass T { }").kind,
            ParseErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn statement_level_class_is_rejected() {
        assert_eq!(
            parse_err("class A { void M() { class B { } } }").kind,
            ParseErrorKind::ExpectedStatement
        );
    }
}
