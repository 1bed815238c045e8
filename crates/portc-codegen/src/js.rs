//! JavaScript output: a single strict-mode script.

use portc_core::{ClassEntry, ConstValue, MethodEntry, Type, Virtuality};

use crate::emitter::{Emitter, RESOURCE_HOLDER};
use crate::literal;

/// A fresh array; numeric elements use typed arrays.
pub(crate) fn new_array(e: &Emitter<'_, '_>, elem: &Type, len: &str) -> String {
    match elem {
        Type::Byte => format!("new Uint8Array({len})"),
        Type::Int | Type::Enum(_) => format!("new Int32Array({len})"),
        Type::Float => format!("new Float32Array({len})"),
        Type::Double => format!("new Float64Array({len})"),
        Type::Array { elem: inner, len: Some(n) } => {
            format!("Array.from({{ length: {len} }}, () => {})", new_array(e, inner, &n.to_string()))
        }
        other => format!("new Array({len}).fill({})", default_value(e, other)),
    }
}

/// Initial value of a field of type `ty`.
fn default_value(e: &Emitter<'_, '_>, ty: &Type) -> String {
    match ty {
        Type::Bool => "false".into(),
        Type::Byte | Type::Int | Type::Long | Type::Float | Type::Double | Type::Enum(_) => "0".into(),
        Type::Array { len: Some(_), .. } => e.fixed_array_storage(ty).unwrap_or_else(|| "null".into()),
        _ => "null".into(),
    }
}

pub(crate) fn generate(e: &mut Emitter<'_, '_>) -> String {
    let header = e.comment("Generated by portc. Do not edit.");
    e.out.writeln(&header);
    e.out.writeln("\"use strict\";");

    for entry in e.program.enums() {
        let members: Vec<String> = entry
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}: {}", e.names.ident(&v.name), e.enum_value(entry.id, i as u32)))
            .collect();
        let body = if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.join(", "))
        };
        let line = format!("const {} = Object.freeze({body});", e.enum_name(entry.id));
        e.out.blank_line();
        e.out.writeln(&line);
    }

    if !e.program.resources().is_empty() {
        e.out.blank_line();
        e.out.writeln(&format!("const {RESOURCE_HOLDER} = {{"));
        e.out.indent();
        for resource in e.program.resources() {
            let rows = literal::byte_rows(e.target, &e.resources[resource.id.index()], 16);
            let name = e.names.resource(resource.id).to_string();
            e.out.writeln(&format!("{name}: new Uint8Array(["));
            e.out.indent();
            for (i, row) in rows.iter().enumerate() {
                let comma = if i + 1 < rows.len() { "," } else { "" };
                e.out.writeln(&format!("{row}{comma}"));
            }
            e.close_with("]),");
        }
        e.close_with("};");
    }

    for id in e.program.classes_by_depth() {
        let class = e.program.class(id);
        e.out.blank_line();
        class_definition(e, class);
    }
    e.take_output()
}

fn class_definition(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    let name = e.class_name(class.id);
    let header = match class.base {
        Some(base) => format!("class {name} extends {}", e.class_name(base)),
        None => format!("class {name}"),
    };
    e.open(&header);

    let mut first = true;
    if !class.is_static {
        constructor(e, class);
        first = false;
    }
    for &id in &class.methods {
        let entry = e.program.method(id);
        if entry.virtuality == Virtuality::Abstract {
            continue;
        }
        if !first {
            e.out.blank_line();
        }
        first = false;
        method(e, entry);
    }
    e.close();

    for &id in &class.consts {
        let entry = e.program.const_entry(id);
        let Some(ConstValue::Array(items)) = e.const_value(id) else {
            continue;
        };
        let elem = entry.ty.element_type().cloned().unwrap_or_default();
        let line = format!("{} = {};", e.const_array_name(id), e.array_literal(&items, &elem));
        e.out.writeln(&line);
    }
}

fn constructor(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    let mut prologue = Vec::new();
    if class.base.is_some() {
        prologue.push("super();".to_string());
    }
    for &id in &class.fields {
        let field = e.program.field(id);
        prologue.push(format!(
            "this.{} = {};",
            e.names.ident(&field.name),
            default_value(e, &field.ty)
        ));
    }
    let ctor = class.constructor.map(|id| e.program.method(id));
    match ctor {
        Some(ctor) => {
            e.enter(ctor.id);
            e.function("constructor()", ctor.body.as_ref(), &[], &prologue);
            e.leave();
        }
        None => e.function("constructor()", None, &[], &prologue),
    }
}

fn method(e: &mut Emitter<'_, '_>, method: &MethodEntry) {
    let frame = e.names.frame(e.program, method.id);
    let params = frame.params.join(", ");
    let prefix = if method.is_static() { "static " } else { "" };
    let header = format!("{prefix}{}({params})", e.names.method(method.id));
    e.enter(method.id);
    e.function(&header, method.body.as_ref(), &[], &[]);
    e.leave();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Target;
    use portc_lowering::Lowering;
    use portc_registry::Program;

    #[test]
    fn typed_arrays_for_numbers() {
        let program = Program::new();
        let lowering = Lowering::new(&program, Vec::new());
        let e = Emitter::new(Target::JavaScript, &lowering, Vec::new());
        assert_eq!(new_array(&e, &Type::Int, "n"), "new Int32Array(n)");
        assert_eq!(new_array(&e, &Type::Bool, "n"), "new Array(n).fill(false)");
        assert_eq!(new_array(&e, &Type::String, "n"), "new Array(n).fill(null)");
        assert_eq!(new_array(&e, &Type::Long, "2"), "new Array(2).fill(0)");
        assert_eq!(
            new_array(&e, &Type::array(Type::Byte, Some(4)), "2"),
            "Array.from({ length: 2 }, () => new Uint8Array(4))"
        );
    }
}
