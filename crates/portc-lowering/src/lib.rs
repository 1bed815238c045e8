//! The lowering contract between the resolver and the code generators.
//!
//! [`Lowering`] answers the questions a generator cannot answer from syntax
//! alone: how a type is stored, which dispatch slot a virtual method
//! occupies, what value a constant folded to, and what bytes a
//! `BinaryResource` path refers to. Everything is computed from the resolved
//! [`Program`]; generators never look names up or re-evaluate constants.
//!
//! Dispatch tables are built once in [`Lowering::new`]. After that every
//! query takes `&self` and returns the same answer for the same input.

pub mod dispatch;
pub mod layout;
pub mod resources;

pub use dispatch::{DispatchSlot, DispatchTable};
pub use layout::{Layout, StorageKind, WORD_SIZE, layout_of};
pub use resources::ResourceLoader;

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use portc_core::{ClassId, ConstValue, MethodId, ResourceError, Span, SymbolRef, Type};
use portc_registry::Program;

/// Read-only queries over a resolved program.
pub struct Lowering<'p> {
    program: &'p Program,
    tables: Vec<DispatchTable>,
    slots: FxHashMap<MethodId, u32>,
    resources: ResourceLoader,
}

impl<'p> Lowering<'p> {
    /// Build the contract for `program`, resolving resources against
    /// `search_dirs` in order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    #[tracing::instrument(level = "debug", skip_all, fields(classes = program.classes().len()))]
    pub fn new(program: &'p Program, search_dirs: Vec<PathBuf>) -> Self {
        let (tables, slots) = dispatch::build_tables(program);
        tracing::debug!(dispatched = slots.len(), "dispatch tables built");
        Self {
            program,
            tables,
            slots,
            resources: ResourceLoader::new(search_dirs),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        self.resources.search_dirs()
    }

    // ==========================================================================
    // Layout
    // ==========================================================================

    pub fn layout_of(&self, ty: &Type) -> Layout {
        layout_of(ty)
    }

    // ==========================================================================
    // Dispatch
    // ==========================================================================

    /// The dispatch table of `class`, base slots first.
    pub fn dispatch_table_of(&self, class: ClassId) -> &DispatchTable {
        &self.tables[class.index()]
    }

    /// The slot of a `virtual`, `override` or `abstract` method.
    pub fn slot_of(&self, method: MethodId) -> Option<u32> {
        self.slots.get(&method).copied()
    }

    /// The class whose table first contains the slot of `method`; its
    /// signature is the one every override must be callable through.
    pub fn slot_introducer(&self, method: MethodId) -> Option<ClassId> {
        let slot = self.slot_of(method)?;
        let owner = self.program.method(method).owner;
        self.program
            .ancestors(owner)
            .take_while(|&class| (slot as usize) < self.dispatch_table_of(class).len())
            .last()
    }

    /// The first class, walking from the root down to `class`, that has a
    /// non-empty dispatch table. Objects carry their table pointer from there
    /// on.
    pub fn dispatch_root(&self, class: ClassId) -> Option<ClassId> {
        self.program
            .ancestors(class)
            .take_while(|&c| !self.dispatch_table_of(c).is_empty())
            .last()
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// The folded value of a constant or an enum value.
    pub fn constant_value_of(&self, symbol: SymbolRef) -> Option<ConstValue> {
        match symbol {
            SymbolRef::Const(id) => self.program.const_entry(id).value.clone(),
            SymbolRef::EnumValue(id, index) => {
                let value = self.program.enum_entry(id).values.get(index as usize)?;
                Some(ConstValue::Enum { id, value: value.value })
            }
            _ => None,
        }
    }

    // ==========================================================================
    // Resources
    // ==========================================================================

    /// Contents of a `BinaryResource` path; `span` locates the reference.
    pub fn resource_bytes_of(&self, path: &str, span: Span) -> Result<Vec<u8>, ResourceError> {
        self.resources.read(path, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use portc_core::DefineSet;
    use portc_parser::ParseSession;
    use portc_registry::GlobalSymbol;

    fn resolve(source: &str) -> Program {
        let arena = Bump::new();
        let mut session = ParseSession::new(&arena, DefineSet::new());
        let script = session.parse_file("test.pc", source).unwrap();
        portc_resolver::resolve(&[script]).unwrap()
    }

    fn class(program: &Program, name: &str) -> ClassId {
        match program.lookup_global(name) {
            Some(GlobalSymbol::Class(id)) => id,
            _ => panic!("{name} is not a class"),
        }
    }

    fn method(program: &Program, class_name: &str, name: &str) -> MethodId {
        let id = class(program, class_name);
        program.class(id).methods.iter().copied().find(|m| program.method(*m).name == name).unwrap()
    }

    const SHAPES: &str = "
        abstract class A {
            public abstract int M();
            public virtual int N() { return 1; }
        }
        class B : A {
            public override int M() { return 2; }
            public virtual int O() { return 3; }
        }
        class C : B {
            public override int N() { return 4; }
        }
    ";

    #[test]
    fn overrides_keep_their_slot() {
        let program = resolve(SHAPES);
        let lowering = Lowering::new(&program, Vec::new());

        let a_m = method(&program, "A", "M");
        let b_m = method(&program, "B", "M");
        assert_eq!(lowering.slot_of(a_m), Some(0));
        assert_eq!(lowering.slot_of(b_m), Some(0));
        assert_eq!(lowering.slot_of(method(&program, "C", "N")), Some(1));
    }

    #[test]
    fn new_virtuals_append() {
        let program = resolve(SHAPES);
        let lowering = Lowering::new(&program, Vec::new());

        let a = lowering.dispatch_table_of(class(&program, "A"));
        let b = lowering.dispatch_table_of(class(&program, "B"));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
        assert_eq!(lowering.slot_of(method(&program, "B", "O")), Some(2));
        let introduced: Vec<u32> = b.introduced().map(|s| s.slot).collect();
        assert_eq!(introduced, vec![2]);
    }

    #[test]
    fn slots_are_stable_across_runs() {
        let slots = |program: &Program| -> Vec<(String, u32, String)> {
            let lowering = Lowering::new(program, Vec::new());
            program
                .classes()
                .iter()
                .flat_map(|c| {
                    lowering
                        .dispatch_table_of(c.id)
                        .slots()
                        .map(|s| (c.name.clone(), s.slot, program.method_path(s.method)))
                        .collect::<Vec<_>>()
                })
                .collect()
        };
        let first = resolve(SHAPES);
        let second = resolve(SHAPES);
        assert_eq!(slots(&first), slots(&second));
        assert_eq!(slots(&first).len(), 2 + 3 + 3);
    }

    #[test]
    fn table_lists_most_derived_implementations() {
        let program = resolve(SHAPES);
        let lowering = Lowering::new(&program, Vec::new());

        let c = lowering.dispatch_table_of(class(&program, "C"));
        let paths: Vec<String> = c.slots().map(|s| program.method_path(s.method)).collect();
        assert_eq!(paths, vec!["B.M", "C.N", "B.O"]);
    }

    #[test]
    fn slot_introducer_and_dispatch_root() {
        let program = resolve(
            "class Plain { public int F() { return 0; } }
             class Mid : Plain { public virtual int G() { return 1; } }
             class Leaf : Mid { public override int G() { return 2; } }",
        );
        let lowering = Lowering::new(&program, Vec::new());
        let leaf = class(&program, "Leaf");
        assert_eq!(lowering.dispatch_root(leaf), Some(class(&program, "Mid")));
        assert_eq!(lowering.dispatch_root(class(&program, "Plain")), None);
        assert_eq!(
            lowering.slot_introducer(method(&program, "Leaf", "G")),
            Some(class(&program, "Mid"))
        );
        assert_eq!(lowering.slot_of(method(&program, "Plain", "F")), None);
    }

    #[test]
    fn constant_values_come_from_the_resolver() {
        let program = resolve(
            "enum E { A, B = 5, C }
             class K { public const int X = 6 * 7; public const int[] T = { 1, 2 }; }",
        );
        let lowering = Lowering::new(&program, Vec::new());
        let k = class(&program, "K");
        let x = program.find_const(k, "X").unwrap();
        let t = program.find_const(k, "T").unwrap();
        assert_eq!(lowering.constant_value_of(SymbolRef::Const(x)), Some(ConstValue::Int(42)));
        assert_eq!(
            lowering.constant_value_of(SymbolRef::Const(t)),
            Some(ConstValue::Array(vec![ConstValue::Int(1), ConstValue::Int(2)]))
        );

        let Some(GlobalSymbol::Enum(e)) = program.lookup_global("E") else {
            panic!("E is not an enum");
        };
        assert_eq!(
            lowering.constant_value_of(SymbolRef::EnumValue(e, 2)),
            Some(ConstValue::Enum { id: e, value: 6 })
        );
        assert_eq!(lowering.constant_value_of(SymbolRef::Class(k)), None);
    }

    #[test]
    fn resources_follow_search_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("x.bin"), [0xCA, 0xFE]).unwrap();
        let program = Program::new();
        let lowering = Lowering::new(
            &program,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(lowering.resource_bytes_of("x.bin", Span::default()).unwrap(), vec![0xCA, 0xFE]);
        assert!(matches!(
            lowering.resource_bytes_of("y.bin", Span::default()),
            Err(ResourceError::NotFound { .. })
        ));
    }
}
