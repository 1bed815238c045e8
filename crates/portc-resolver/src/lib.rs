//! Semantic resolution for portc.
//!
//! Turns parsed scripts into a fully typed [`Program`]. Resolution runs as a
//! fixed sequence of whole-program passes:
//!
//! 1. **Declarations**: every class, enum and delegate name
//! 2. **Hierarchy**: base classes, cycle detection, depth ordering
//! 3. **Members**: fields, constants, methods, signatures; enum values and
//!    class constants are folded here
//! 4. **Overrides**: `virtual` / `override` / `abstract` rules
//! 5. **Bodies**: bidirectional type checking of every body into IR
//! 6. **Flow**: reachability, definite assignment and return checks
//!
//! The first error stops resolution. Warnings are kept on the program.
//!
//! ## Modules
//!
//! - [`checker`]: expression and statement checking
//! - [`context`]: program under construction plus its declarations
//! - [`conversion`]: implicit conversions and their cost
//! - [`flow`]: control-flow verification over IR
//! - [`fold`]: constant folding with range checks
//! - [`overload`]: overload ranking
//! - [`scope`]: block-structured local scopes

pub mod checker;
pub mod context;
pub mod conversion;
pub mod flow;
pub mod fold;
pub mod overload;
pub mod passes;
pub mod scope;

pub use checker::Checker;
pub use context::Context;
pub use conversion::{Conversion, find_implicit};
pub use overload::{OverloadMatch, resolve_overload};
pub use passes::{BodyPass, DeclarationPass, FlowPass, HierarchyPass, MemberPass, OverridePass};

pub use portc_core::{ResolveError, ResolveFailure};

use portc_parser::ast::Script;
use portc_registry::Program;

/// Runs every pass over a set of scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `scripts`, given in input order, into one program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    #[tracing::instrument(level = "debug", skip_all, fields(scripts = scripts.len()))]
    pub fn resolve<'ast>(&self, scripts: &[Script<'ast>]) -> Result<Program, ResolveFailure> {
        let mut ctx = Context::new();

        let declared = DeclarationPass::new(&mut ctx).run(scripts)?;
        tracing::debug!(
            classes = declared.classes,
            enums = declared.enums,
            delegates = declared.delegates,
            "declarations registered"
        );

        let order = HierarchyPass::new(&mut ctx).run()?;
        let members = MemberPass::new(&mut ctx, &order).run()?;
        tracing::debug!(
            fields = members.fields,
            consts = members.consts,
            methods = members.methods,
            "members registered"
        );

        OverridePass::new(&mut ctx, &order).run()?;
        let bodies = BodyPass::new(&mut ctx).run()?;
        tracing::debug!(bodies, "bodies checked");

        let mut program = ctx.program;
        let warnings = FlowPass::new(&mut program).run()?;
        tracing::debug!(warnings, "flow verified");
        Ok(program)
    }
}

/// Resolve `scripts` with a default [`Resolver`].
pub fn resolve(scripts: &[Script<'_>]) -> Result<Program, ResolveFailure> {
    Resolver::new().resolve(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use portc_core::ir::{Dispatch, ExprKind, Receiver, StmtKind};
    use portc_core::{ConstValue, DefineSet, ResolveErrorKind, Type, Virtuality};
    use portc_parser::ParseSession;
    use portc_registry::GlobalSymbol;

    fn resolve_source(source: &str) -> Result<Program, ResolveFailure> {
        let arena = Bump::new();
        let mut session = ParseSession::new(&arena, DefineSet::new());
        let script = session.parse_file("test.pc", source).expect("parse failed");
        resolve(&[script])
    }

    fn resolve_ok(source: &str) -> Program {
        match resolve_source(source) {
            Ok(program) => program,
            Err(e) => panic!("resolution failed: {e:?}"),
        }
    }

    fn resolve_err(source: &str) -> ResolveErrorKind {
        match resolve_source(source) {
            Ok(_) => panic!("expected a resolution error"),
            Err(e) => e.kind(),
        }
    }

    fn class(program: &Program, name: &str) -> portc_core::ClassId {
        match program.lookup_global(name) {
            Some(GlobalSymbol::Class(id)) => id,
            other => panic!("{name} is not a class: {other:?}"),
        }
    }

    fn method(program: &Program, class_name: &str, name: &str) -> portc_core::MethodId {
        let id = class(program, class_name);
        program.find_methods(id, name)[0]
    }

    /// The single call expression in the first statement of `Class.Method`.
    fn first_call(program: &Program, class_name: &str, name: &str) -> (portc_core::MethodId, Dispatch, bool) {
        let body = program.method(method(program, class_name, name)).body.as_ref().unwrap();
        let expr = match &body.stmts[0].kind {
            StmtKind::Expr(e) => e,
            StmtKind::Return(Some(e)) => e,
            other => panic!("unexpected statement {other:?}"),
        };
        match &expr.kind {
            ExprKind::Call {
                method,
                dispatch,
                receiver,
                ..
            } => (*method, *dispatch, matches!(receiver, Receiver::Base)),
            other => panic!("expected a call, found {other:?}"),
        }
    }

    #[test]
    fn enum_values_follow_explicit_assignments() {
        let program = resolve_ok("enum E { A, B = 5, C }");
        let values: Vec<i64> = program.enums()[0].values.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![0, 5, 6]);
    }

    #[test]
    fn enum_auto_increment_overflow() {
        assert_eq!(
            resolve_err("enum E { A = 2147483647, B }"),
            ResolveErrorKind::ConstantOverflow
        );
    }

    #[test]
    fn class_constant_may_refer_forward() {
        let program = resolve_ok(
            "class A { public const int X = B.Y * 2; }
             class B { public const int Y = 21; }",
        );
        let a = class(&program, "A");
        let x = program.find_const(a, "X").unwrap();
        assert_eq!(program.const_entry(x).value, Some(ConstValue::Int(42)));
        assert_eq!(program.const_entry(x).ty, Type::Int);
    }

    #[test]
    fn cyclic_constants_are_not_constant() {
        assert_eq!(
            resolve_err("class A { const int X = Y; const int Y = X; }"),
            ResolveErrorKind::NotConstant
        );
    }

    #[test]
    fn overload_picks_cheapest_conversion() {
        let program = resolve_ok(
            "class P {
                static void F(int x) { }
                static void F(long x) { }
                static void G() { F(1); }
             }",
        );
        let (target, dispatch, _) = first_call(&program, "P", "G");
        assert_eq!(program.method(target).params[0].ty, Type::Int);
        assert_eq!(dispatch, Dispatch::Static);
    }

    #[test]
    fn equal_cost_overloads_are_ambiguous() {
        assert_eq!(
            resolve_err(
                "class P {
                    static void F(int a, long b) { }
                    static void F(long a, int b) { }
                    static void G() { F(1, 2); }
                 }"
            ),
            ResolveErrorKind::AmbiguousCall
        );
    }

    #[test]
    fn cyclic_inheritance_is_rejected() {
        assert_eq!(
            resolve_err("class A : B { } class B : A { }"),
            ResolveErrorKind::CyclicInheritance
        );
    }

    #[test]
    fn unknown_base_class() {
        assert_eq!(resolve_err("class A : Missing { }"), ResolveErrorKind::UnknownBaseClass);
    }

    #[test]
    fn missing_return_on_some_path() {
        let err = resolve_source(
            "class P { static int F(bool b) { if (b) { return 1; } } }",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::MissingReturn);
        assert_eq!(err.method.as_deref(), Some("P.F"));
    }

    #[test]
    fn infinite_loop_needs_no_return() {
        resolve_ok("class P { static int F() { while (true) { } } }");
    }

    #[test]
    fn read_before_assignment() {
        assert_eq!(
            resolve_err("class P { static int F(bool b) { int x; if (b) { x = 1; } return x; } }"),
            ResolveErrorKind::UseBeforeAssignment
        );
    }

    #[test]
    fn assigned_on_every_path() {
        resolve_ok("class P { static int F(bool b) { int x; if (b) { x = 1; } else { x = 2; } return x; } }");
    }

    #[test]
    fn and_assigns_on_the_true_branch() {
        resolve_ok("class P { static int F(bool b) { int x; if (b && (x = 1) > 0) { return x; } return 0; } }");
        assert_eq!(
            resolve_err("class P { static int F(bool b) { int x; if (b && (x = 1) > 0) { return 0; } return x; } }"),
            ResolveErrorKind::UseBeforeAssignment
        );
    }

    #[test]
    fn or_assigns_on_the_false_branch() {
        resolve_ok("class P { static int F(bool b) { int x; if (b || (x = 1) > 0) { return 0; } return x; } }");
        resolve_ok("class P { static int F(bool b) { int x; while (b || (x = 1) > 0) { } return x; } }");
        resolve_ok("class P { static int F(bool b) { int x; if (!(b || (x = 1) > 0)) { return x; } return 0; } }");
        assert_eq!(
            resolve_err("class P { static int F(bool b) { int x; if (b || (x = 1) > 0) { return x; } return 0; } }"),
            ResolveErrorKind::UseBeforeAssignment
        );
    }

    #[test]
    fn conditional_operator_splits_on_its_condition() {
        resolve_ok("class P { static int F(bool b) { int x; return b && (x = 2) > 1 ? x : 0; } }");
    }

    #[test]
    fn case_fall_through() {
        assert_eq!(
            resolve_err(
                "class P { static void F(int v) {
                    switch (v) { case 1: F(2); case 2: break; }
                } }"
            ),
            ResolveErrorKind::CaseFallThrough
        );
    }

    #[test]
    fn break_outside_loop() {
        assert_eq!(
            resolve_err("class P { static void F() { break; } }"),
            ResolveErrorKind::InvalidJump
        );
    }

    #[test]
    fn private_field_is_inaccessible() {
        assert_eq!(
            resolve_err(
                "class A { int secret; }
                 class B { static int F(A a) { return a.secret; } }"
            ),
            ResolveErrorKind::Inaccessible
        );
    }

    #[test]
    fn hidden_overloads_do_not_compete() {
        let program = resolve_ok(
            "class A { void F(int a) { } }
             class B : A { public void F(long a) { } void G() { F(1); } }",
        );
        let (chosen, _, _) = first_call(&program, "B", "G");
        assert_eq!(program.method(chosen).owner, class(&program, "B"));
    }

    #[test]
    fn only_a_hidden_overload_applies() {
        assert_eq!(
            resolve_err(
                "class A { void F(int a) { } }
                 class B : A { public void F(string s) { } void G() { F(1); } }"
            ),
            ResolveErrorKind::Inaccessible
        );
    }

    #[test]
    fn abstract_class_cannot_be_instantiated() {
        assert_eq!(
            resolve_err(
                "abstract class Shape { public abstract int Area(); }
                 class P { static void F() { Shape s = new Shape(); } }"
            ),
            ResolveErrorKind::AbstractInstantiation
        );
    }

    #[test]
    fn abstract_methods_must_be_implemented() {
        assert_eq!(
            resolve_err(
                "abstract class Shape { public abstract int Area(); }
                 class Square : Shape { }"
            ),
            ResolveErrorKind::InvalidOverride
        );
    }

    #[test]
    fn inherited_signatures_cannot_be_hidden() {
        for source in [
            "class A { public void F() { } } class B : A { public void F() { } }",
            "class A { public static int F(int a) { return a; } } class B : A { public static int F(int a) { return 0; } }",
        ] {
            assert_eq!(resolve_err(source), ResolveErrorKind::InvalidOverride, "{source}");
        }
    }

    #[test]
    fn override_needs_a_virtual_base() {
        assert_eq!(
            resolve_err(
                "class A { public int F() { return 1; } }
                 class B : A { public override int F() { return 2; } }"
            ),
            ResolveErrorKind::InvalidOverride
        );
    }

    #[test]
    fn dispatch_modes() {
        let program = resolve_ok(
            "class A {
                public virtual int F() { return 1; }
                public int G() { return F(); }
             }
             class B : A {
                public override int F() { return base.F() + 1; }
             }",
        );
        let (target, dispatch, _) = first_call(&program, "A", "G");
        assert_eq!(program.method_path(target), "A.F");
        assert_eq!(dispatch, Dispatch::Virtual);

        let b_f = method(&program, "B", "F");
        assert_eq!(program.method(b_f).virtuality, Virtuality::Override);
        assert_eq!(program.method(b_f).overrides, Some(method(&program, "A", "F")));
    }

    #[test]
    fn base_call_is_direct() {
        let program = resolve_ok(
            "class A { public virtual void F() { } }
             class B : A { public override void F() { base.F(); } }",
        );
        let (target, dispatch, through_base) = first_call(&program, "B", "F");
        assert_eq!(program.method_path(target), "A.F");
        assert_eq!(dispatch, Dispatch::Direct);
        assert!(through_base);
    }

    #[test]
    fn unreachable_code_is_a_warning() {
        let program = resolve_ok("class P { static int F() { return 1; F(); } }");
        assert_eq!(program.warnings().len(), 1);
        assert!(program.warnings()[0].message.contains("unreachable"));
    }

    #[test]
    fn resources_are_deduplicated() {
        let program = resolve_ok(
            r#"class P {
                static void F() { const byte[] x = BinaryResource("a.bin"); }
                static void G() { const byte[] y = BinaryResource("a.bin"); }
             }"#,
        );
        assert_eq!(program.resources().len(), 1);
        assert_eq!(program.resources()[0].path, "a.bin");
    }

    #[test]
    fn implicit_conversions_are_explicit_in_ir() {
        let program = resolve_ok("class P { static long F(int x) { return x; } }");
        let body = program.method(method(&program, "P", "F")).body.as_ref().unwrap();
        let StmtKind::Return(Some(value)) = &body.stmts[0].kind else {
            panic!("expected a return");
        };
        assert!(matches!(value.kind, ExprKind::Coerce { .. }));
        assert_eq!(value.ty, Type::Long);
    }

    #[test]
    fn duplicate_signature_in_one_class() {
        assert_eq!(
            resolve_err("class P { static void F(int a) { } static void F(int b) { } }"),
            ResolveErrorKind::DuplicateSymbol
        );
        let Err(failure) = resolve_source("class P { static void F(int a, long b) { } static void F(int c, long d) { } }") else {
            panic!("expected a resolution error");
        };
        assert_eq!(failure.error.to_string(), "P.F(int, long) already defined");
    }
}
