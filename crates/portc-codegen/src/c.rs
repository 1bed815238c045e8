//! C89 and C99 output.
//!
//! Every class becomes a struct holding its whole chain of fields, base
//! fields first. From the first class of a chain that has a dispatch table
//! on, the struct starts its own fields with a `vtbl` pointer, and each
//! class with a non-empty table gets a `Class_Vtbl` struct of function
//! pointers in slot order. Slot functions take the class that introduced
//! the slot as `self`, so one table layout serves the whole subtree.
//!
//! For a class `C` the output contains:
//!
//! - `C_Construct(C *self)`, which runs the base constructor, then the body
//! - `C_New(void)` for concrete classes: allocate, install `C_vtbl`, construct
//! - `C_M(...)` for static and non-virtual methods
//! - `C_M_impl(...)` for the body of every dispatched method
//! - `C_M(...)` dispatchers for the slots `C` introduces

use portc_core::{ClassEntry, ClassId, ConstOwner, ConstValue, MethodEntry, MethodId, Type, Visibility};
use portc_lowering::StorageKind;

use crate::Target;
use crate::emitter::{Emitter, RESOURCE_HOLDER};
use crate::literal;

/// Parameter naming the receiver of an inherited slot function.
const BASE_SELF: &str = "base_self";

/// C declaration of `name` with type `ty`; an empty name yields the
/// abstract declarator used in casts and `sizeof`.
///
/// The storage kind from the layout decides the shape: values are written
/// by their scalar name, owned arrays as inline `[n]` storage and
/// everything else through a pointer.
pub(crate) fn declarator(e: &Emitter<'_, '_>, ty: &Type, name: &str) -> String {
    match (e.lowering.layout_of(ty).kind, ty) {
        (StorageKind::OwnedArray, Type::Array { elem, len: Some(n) }) => {
            declarator(e, elem, &format!("{}[{n}]", wrap(name)))
        }
        (StorageKind::Value, _) => join(scalar_name(e, ty).as_str(), name),
        _ => indirect(e, ty, name),
    }
}

fn indirect(e: &Emitter<'_, '_>, ty: &Type, name: &str) -> String {
    match ty {
        Type::Array { elem, .. } => declarator(e, elem, &format!("*{name}")),
        Type::Pointer { target, readonly } => match target.as_ref() {
            Type::Array { elem, len: None } => {
                let decl = declarator(e, elem, &format!("*{name}"));
                if *readonly && elem.is_primitive() {
                    format!("const {decl}")
                } else {
                    decl
                }
            }
            other => declarator(e, other, &format!("*{name}")),
        },
        Type::Class(id) => join(&format!("{} *", e.class_name(*id)), name),
        Type::String => join("const char *", name),
        // Delegate typedefs are function pointers already.
        Type::Delegate(id) => join(&e.names.ident(&e.program.delegate(*id).name), name),
        _ => join("void *", name),
    }
}

fn scalar_name(e: &Emitter<'_, '_>, ty: &Type) -> String {
    match ty {
        Type::Bool if e.target == Target::C89 => "int".into(),
        Type::Bool => "bool".into(),
        Type::Byte => "unsigned char".into(),
        Type::Int => "int".into(),
        Type::Long if e.target == Target::C89 => "long".into(),
        Type::Long => "int64_t".into(),
        Type::Float => "float".into(),
        Type::Double => "double".into(),
        Type::Enum(id) => e.enum_name(*id),
        _ => "void".into(),
    }
}

fn wrap(name: &str) -> String {
    if name.starts_with('*') {
        format!("({name})")
    } else {
        name.to_string()
    }
}

fn join(base: &str, name: &str) -> String {
    if base.ends_with('*') || name.is_empty() {
        format!("{base}{name}")
    } else {
        format!("{base} {name}")
    }
}

pub(crate) fn generate(e: &mut Emitter<'_, '_>) -> String {
    let header = e.comment("Generated by portc. Do not edit.");
    e.out.writeln(&header);
    e.out.writeln("#include <stdlib.h>");
    e.out.writeln("#include <string.h>");
    if e.target == Target::C99 {
        e.out.writeln("#include <stdbool.h>");
        e.out.writeln("#include <stdint.h>");
    }
    e.out.blank_line();
    e.out.writeln("#ifndef PORTC_THROW");
    e.out.writeln("#define PORTC_THROW(message) abort()");
    e.out.writeln("#endif");

    enums(e);
    type_declarations(e);
    resources(e);
    class_constants(e);
    prototypes(e);
    vtables(e);
    functions(e);
    e.take_output()
}

fn object_classes<'p>(e: &Emitter<'_, 'p>) -> Vec<&'p ClassEntry> {
    e.program.classes().iter().filter(|c| !c.is_static).collect()
}

fn enums(e: &mut Emitter<'_, '_>) {
    for entry in e.program.enums() {
        e.out.blank_line();
        let name = e.enum_name(entry.id);
        if entry.values.is_empty() {
            e.out.writeln(&format!("typedef int {name};"));
            continue;
        }
        e.out.writeln("typedef enum");
        e.out.writeln("{");
        e.out.indent();
        for i in 0..entry.values.len() {
            let comma = if i + 1 < entry.values.len() { "," } else { "" };
            let index = i as u32;
            let line = format!("{} = {}{comma}", e.enum_member(entry.id, index), e.enum_value(entry.id, index));
            e.out.writeln(&line);
        }
        e.close_with(&format!("}} {name};"));
    }
}

fn type_declarations(e: &mut Emitter<'_, '_>) {
    let classes = object_classes(e);
    e.out.blank_line();
    for class in &classes {
        let name = e.class_name(class.id);
        e.out.writeln(&format!("typedef struct {name} {name};"));
        if !e.lowering.dispatch_table_of(class.id).is_empty() {
            e.out.writeln(&format!("typedef struct {name}_Vtbl {name}_Vtbl;"));
        }
    }

    for delegate in e.program.delegates() {
        let name = e.names.ident(&delegate.name);
        let params: Vec<String> = delegate
            .params
            .iter()
            .map(|p| declarator(e, &p.ty, &e.names.ident(&p.name)))
            .collect();
        let function = format!("(*{name})({})", param_list(params));
        let line = format!("typedef {};", declarator(e, &delegate.return_type, &function));
        e.out.writeln(&line);
    }

    for class in &classes {
        e.out.blank_line();
        struct_definition(e, class);
        if !e.lowering.dispatch_table_of(class.id).is_empty() {
            e.out.blank_line();
            vtbl_definition(e, class);
        }
    }
}

fn struct_definition(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    let root = e.lowering.dispatch_root(class.id);
    let mut chain: Vec<ClassId> = e.program.ancestors(class.id).collect();
    chain.reverse();

    e.open(&format!("struct {}", e.class_name(class.id)));
    let mut members = 0;
    for ancestor in chain {
        if Some(ancestor) == root {
            e.out.writeln("const void *vtbl;");
            members += 1;
        }
        for &field in &e.program.class(ancestor).fields {
            let field = e.program.field(field);
            let line = format!("{};", declarator(e, &field.ty, &e.names.ident(&field.name)));
            e.out.writeln(&line);
            members += 1;
        }
    }
    if members == 0 {
        e.out.writeln("char unused;");
    }
    e.close_with("};");
}

fn vtbl_definition(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    e.open(&format!("struct {}_Vtbl", e.class_name(class.id)));
    let slots: Vec<MethodId> = e.lowering.dispatch_table_of(class.id).slots().map(|s| s.method).collect();
    for method in slots {
        let intro = e.lowering.slot_introducer(method).unwrap_or(class.id);
        let entry = e.program.method(method);
        let receiver = format!("{} *self", e.class_name(intro));
        let function = format!("(*{})({})", e.names.method(method), params(e, entry, Some(receiver)));
        let line = format!("{};", declarator(e, &entry.return_type, &function));
        e.out.writeln(&line);
    }
    e.close_with("};");
}

fn resources(e: &mut Emitter<'_, '_>) {
    if e.program.resources().is_empty() {
        return;
    }
    e.out.blank_line();
    for resource in e.program.resources() {
        let name = format!("{RESOURCE_HOLDER}_{}", e.names.resource(resource.id));
        let bytes = &e.resources[resource.id.index()];
        let rows = if bytes.is_empty() {
            vec!["0".to_string()]
        } else {
            literal::byte_rows(e.target, bytes, 16)
        };
        e.out.writeln(&format!("static const unsigned char {name}[] = {{"));
        e.out.indent();
        for (i, row) in rows.iter().enumerate() {
            let comma = if i + 1 < rows.len() { "," } else { "" };
            e.out.writeln(&format!("{row}{comma}"));
        }
        e.close_with("};");
    }
}

fn class_constants(e: &mut Emitter<'_, '_>) {
    let arrays: Vec<_> = e
        .program
        .consts()
        .iter()
        .filter(|c| matches!(c.owner, ConstOwner::Class(_)))
        .filter_map(|c| match e.const_value(c.id) {
            Some(ConstValue::Array(items)) => Some((c, items)),
            _ => None,
        })
        .collect();
    if arrays.is_empty() {
        return;
    }
    e.out.blank_line();
    for (entry, items) in arrays {
        let elem = entry.ty.element_type().cloned().unwrap_or_default();
        let name = e.const_array_name(entry.id);
        let line = format!(
            "static {} = {};",
            e.const_array_decl(&entry.ty, &name),
            e.array_literal(&items, &elem)
        );
        e.out.writeln(&line);
    }
}

// ==========================================================================
// Functions
// ==========================================================================

/// One C function: its declaration line and how its body is written.
struct Function {
    signature: String,
    kind: FunctionKind,
}

enum FunctionKind {
    Construct(ClassId),
    New(ClassId),
    Method(MethodId),
    /// The body of a dispatched method.
    Impl(MethodId),
    /// Calls a slot through the object's table.
    Dispatcher(MethodId),
}

fn param_list(params: Vec<String>) -> String {
    if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    }
}

/// Parameter list of `method`, preceded by `receiver` when given.
fn params(e: &Emitter<'_, '_>, method: &MethodEntry, receiver: Option<String>) -> String {
    let frame = e.names.frame(e.program, method.id);
    let mut all: Vec<String> = receiver.into_iter().collect();
    all.extend(
        method
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| declarator(e, &p.ty, frame.param(i as u32))),
    );
    param_list(all)
}

fn is_local(class: &ClassEntry, visibility: Visibility) -> bool {
    !class.is_public || visibility == Visibility::Private
}

fn class_functions(e: &Emitter<'_, '_>, class: &ClassEntry) -> Vec<Function> {
    let name = e.class_name(class.id);
    let mut out = Vec::new();
    if !class.is_static {
        out.push(Function {
            signature: format!("static void {name}_Construct({name} *self)"),
            kind: FunctionKind::Construct(class.id),
        });
        if !class.is_abstract {
            let linkage = if class.is_public { "" } else { "static " };
            out.push(Function {
                signature: format!("{linkage}{name} *{name}_New(void)"),
                kind: FunctionKind::New(class.id),
            });
        }
    }

    for &id in &class.methods {
        let method = e.program.method(id);
        let mangled = e.names.method(id);
        let linkage = if is_local(class, method.visibility) { "static " } else { "" };
        if method.virtuality.is_dispatched() {
            if method.body.is_some() {
                let intro = e.lowering.slot_introducer(id).unwrap_or(class.id);
                let receiver = if intro == class.id {
                    format!("{name} *self")
                } else {
                    format!("{} *{BASE_SELF}", e.class_name(intro))
                };
                let function = format!("{name}_{mangled}_impl({})", params(e, method, Some(receiver)));
                out.push(Function {
                    signature: format!("static {}", declarator(e, &method.return_type, &function)),
                    kind: FunctionKind::Impl(id),
                });
            }
            if method.overrides.is_none() {
                let function = format!("{name}_{mangled}({})", params(e, method, Some(format!("{name} *self"))));
                out.push(Function {
                    signature: format!("{linkage}{}", declarator(e, &method.return_type, &function)),
                    kind: FunctionKind::Dispatcher(id),
                });
            }
        } else {
            let receiver = (!method.is_static()).then(|| format!("{name} *self"));
            let function = format!("{name}_{mangled}({})", params(e, method, receiver));
            out.push(Function {
                signature: format!("{linkage}{}", declarator(e, &method.return_type, &function)),
                kind: FunctionKind::Method(id),
            });
        }
    }
    out
}

fn prototypes(e: &mut Emitter<'_, '_>) {
    e.out.blank_line();
    for class in e.program.classes() {
        for function in class_functions(e, class) {
            e.out.writeln(&format!("{};", function.signature));
        }
    }
}

fn vtables(e: &mut Emitter<'_, '_>) {
    for class in object_classes(e) {
        let table = e.lowering.dispatch_table_of(class.id);
        if class.is_abstract || table.is_empty() {
            continue;
        }
        let entries: Vec<String> = table
            .slots()
            .map(|slot| {
                let method = e.program.method(slot.method);
                format!("{}_{}_impl", e.class_name(method.owner), e.names.method(slot.method))
            })
            .collect();
        let name = e.class_name(class.id);
        e.out.blank_line();
        e.out.writeln(&format!("static const {name}_Vtbl {name}_vtbl = {{"));
        e.out.indent();
        for (i, entry) in entries.iter().enumerate() {
            let comma = if i + 1 < entries.len() { "," } else { "" };
            e.out.writeln(&format!("{entry}{comma}"));
        }
        e.close_with("};");
    }
}

fn functions(e: &mut Emitter<'_, '_>) {
    for class in e.program.classes() {
        for function in class_functions(e, class) {
            e.out.blank_line();
            let header = function.signature.as_str();
            match function.kind {
                FunctionKind::Construct(id) => construct(e, header, id),
                FunctionKind::New(id) => new_object(e, header, id),
                FunctionKind::Method(id) => method_body(e, header, id, Vec::new()),
                FunctionKind::Impl(id) => {
                    let owner = e.program.method(id).owner;
                    let intro = e.lowering.slot_introducer(id).unwrap_or(owner);
                    let mut preamble = Vec::new();
                    if intro != owner {
                        let name = e.class_name(owner);
                        preamble.push(format!("{name} *self = ({name} *) {BASE_SELF};"));
                    }
                    method_body(e, header, id, preamble);
                }
                FunctionKind::Dispatcher(id) => dispatcher(e, header, id),
            }
        }
    }
}

fn method_body(e: &mut Emitter<'_, '_>, header: &str, id: MethodId, preamble: Vec<String>) {
    let body = e.program.method(id).body.as_ref();
    e.enter(id);
    e.function(header, body, &preamble, &[]);
    e.leave();
}

fn construct(e: &mut Emitter<'_, '_>, header: &str, class: ClassId) {
    let entry = e.program.class(class);
    let mut prologue = Vec::new();
    if let Some(base) = entry.base {
        let base = e.class_name(base);
        prologue.push(format!("{base}_Construct(({base} *) self);"));
    }
    match entry.constructor {
        Some(ctor) => {
            let body = e.program.method(ctor).body.as_ref();
            e.enter(ctor);
            e.function(header, body, &[], &prologue);
            e.leave();
        }
        None => e.function(header, None, &[], &prologue),
    }
}

fn new_object(e: &mut Emitter<'_, '_>, header: &str, class: ClassId) {
    let name = e.class_name(class);
    let preamble = vec![format!("{name} *self = ({name} *) calloc(1, sizeof({name}));")];
    let mut prologue = Vec::new();
    if !e.lowering.dispatch_table_of(class).is_empty() {
        prologue.push(format!("self->vtbl = &{name}_vtbl;"));
    }
    prologue.push(format!("{name}_Construct(self);"));
    prologue.push("return self;".to_string());
    e.function(header, None, &preamble, &prologue);
}

fn dispatcher(e: &mut Emitter<'_, '_>, header: &str, id: MethodId) {
    let method = e.program.method(id);
    let name = e.class_name(method.owner);
    let frame = e.names.frame(e.program, id);
    let mut args = vec!["self".to_string()];
    args.extend(frame.params.iter().cloned());
    let call = format!(
        "((const {name}_Vtbl *) self->vtbl)->{}({})",
        e.names.method(id),
        args.join(", ")
    );
    let line = if method.return_type.is_void() {
        format!("{call};")
    } else {
        format!("return {call};")
    };
    e.function(header, None, &[], &[line]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_core::ClassId;
    use portc_lowering::Lowering;
    use portc_registry::Program;

    fn decl(ty: &Type, name: &str) -> String {
        let program = Program::new();
        let lowering = Lowering::new(&program, Vec::new());
        let e = Emitter::new(Target::C99, &lowering, Vec::new());
        declarator(&e, ty, name)
    }

    #[test]
    fn declarators_nest() {
        assert_eq!(decl(&Type::Int, "x"), "int x");
        assert_eq!(decl(&Type::array(Type::Int, Some(3)), "a"), "int a[3]");
        assert_eq!(decl(&Type::array(Type::array(Type::Int, Some(4)), Some(3)), "a"), "int a[3][4]");
        assert_eq!(decl(&Type::array_ref(Type::Byte, true), "p"), "const unsigned char *p");
        assert_eq!(
            decl(&Type::array_ref(Type::array(Type::Int, Some(4)), false), "p"),
            "int (*p)[4]"
        );
        assert_eq!(decl(&Type::array_ref(Type::Int, false), ""), "int *");
        assert_eq!(decl(&Type::String, "s"), "const char *s");
        assert_eq!(decl(&Type::Long, ""), "int64_t");
    }

    #[test]
    fn class_declarators_are_pointers() {
        let mut program = Program::new();
        let id = program.register_class("Node", portc_core::Span::default()).unwrap();
        assert_eq!(id, ClassId(0));
        let lowering = Lowering::new(&program, Vec::new());
        let e = Emitter::new(Target::C89, &lowering, Vec::new());
        assert_eq!(declarator(&e, &Type::Class(id), "next"), "Node *next");
        assert_eq!(declarator(&e, &Type::array(Type::Class(id), Some(2)), "kids"), "Node *kids[2]");
        assert_eq!(declarator(&e, &Type::array_ref(Type::Class(id), false), "all"), "Node **all");
        assert_eq!(declarator(&e, &Type::Bool, "ok"), "int ok");
    }
}
