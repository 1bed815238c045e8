//! C# output: one file holding every type, optionally inside a namespace.

use portc_core::{ClassEntry, ConstValue, MethodEntry, MethodId, MethodKind, Type, Virtuality};

use crate::emitter::{Emitter, RESOURCE_HOLDER};
use crate::literal;

pub(crate) fn type_name(e: &Emitter<'_, '_>, ty: &Type) -> String {
    match ty {
        Type::Void => "void".into(),
        Type::Bool => "bool".into(),
        Type::Byte => "byte".into(),
        Type::Int => "int".into(),
        Type::Long => "long".into(),
        Type::Float => "float".into(),
        Type::Double => "double".into(),
        Type::String => "string".into(),
        Type::Enum(id) => e.enum_name(*id),
        Type::Class(id) => e.class_name(*id),
        Type::Delegate(id) => e.names.ident(&e.program.delegate(*id).name),
        Type::Array { elem, .. } => format!("{}[]", type_name(e, elem)),
        Type::Pointer { target, .. } => type_name(e, target),
        Type::Null => "object".into(),
    }
}

/// `new T[len]`; fixed inner arrays get their own storage per element.
pub(crate) fn new_array(e: &Emitter<'_, '_>, elem: &Type, len: &str) -> String {
    if let Type::Array { elem: inner, len: Some(n) } = elem {
        let storage = new_array(e, inner, &n.to_string());
        return format!("Enumerable.Range(0, {len}).Select(_ => {storage}).ToArray()");
    }
    let name = type_name(e, elem);
    match name.find('[') {
        Some(at) => format!("new {}[{len}]{}", &name[..at], &name[at..]),
        None => format!("new {name}[{len}]"),
    }
}

pub(crate) fn generate(e: &mut Emitter<'_, '_>, namespace: Option<&str>) -> String {
    let header = e.comment("Generated by portc. Do not edit.");
    e.out.writeln(&header);
    e.out.writeln("using System.Linq;");
    if let Some(namespace) = namespace {
        e.out.blank_line();
        e.open(&format!("namespace {namespace}"));
    }

    for entry in e.program.enums() {
        e.out.blank_line();
        let access = if entry.is_public { "public " } else { "" };
        e.open(&format!("{access}enum {}", e.enum_name(entry.id)));
        for (i, value) in entry.values.iter().enumerate() {
            let comma = if i + 1 < entry.values.len() { "," } else { "" };
            let line = format!("{} = {}{comma}", e.names.ident(&value.name), e.enum_value(entry.id, i as u32));
            e.out.writeln(&line);
        }
        e.close();
    }

    if !e.program.delegates().is_empty() {
        e.out.blank_line();
    }
    for delegate in e.program.delegates() {
        let access = if delegate.is_public { "public " } else { "" };
        let params: Vec<String> = delegate
            .params
            .iter()
            .map(|p| format!("{} {}", type_name(e, &p.ty), e.names.ident(&p.name)))
            .collect();
        let line = format!(
            "{access}delegate {} {}({});",
            type_name(e, &delegate.return_type),
            e.names.ident(&delegate.name),
            params.join(", ")
        );
        e.out.writeln(&line);
    }

    for class in e.program.classes() {
        e.out.blank_line();
        class_definition(e, class);
    }

    if !e.program.resources().is_empty() {
        e.out.blank_line();
        e.open(&format!("static class {RESOURCE_HOLDER}"));
        for resource in e.program.resources() {
            let rows = literal::byte_rows(e.target, &e.resources[resource.id.index()], 16);
            let name = e.names.resource(resource.id).to_string();
            e.out.writeln(&format!("internal static readonly byte[] {name} ="));
            e.out.writeln("{");
            e.out.indent();
            for (i, row) in rows.iter().enumerate() {
                let comma = if i + 1 < rows.len() { "," } else { "" };
                e.out.writeln(&format!("{row}{comma}"));
            }
            e.close_with("};");
        }
        e.close();
    }

    if namespace.is_some() {
        e.close();
    }
    e.take_output()
}

fn class_definition(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    let mut header = String::new();
    if class.is_public {
        header.push_str("public ");
    }
    if class.is_static {
        header.push_str("static ");
    } else if class.is_abstract {
        header.push_str("abstract ");
    }
    header.push_str("class ");
    header.push_str(&e.class_name(class.id));
    if let Some(base) = class.base {
        header.push_str(&format!(" : {}", e.class_name(base)));
    }
    e.open(&header);

    for &id in &class.consts {
        let entry = e.program.const_entry(id);
        let Some(value) = e.const_value(id) else {
            continue;
        };
        let name = e.names.ident(&entry.name);
        let line = match &value {
            ConstValue::Array(_) => format!(
                "{} static readonly {} {name} = {};",
                entry.visibility.as_str(),
                type_name(e, &entry.ty),
                e.constant(&value, &entry.ty)
            ),
            _ => format!(
                "{} const {} {name} = {};",
                entry.visibility.as_str(),
                type_name(e, &entry.ty),
                e.constant(&value, &entry.ty)
            ),
        };
        e.out.writeln(&line);
    }

    for &id in &class.fields {
        let field = e.program.field(id);
        let mut line = format!(
            "{} {} {}",
            field.visibility.as_str(),
            type_name(e, &field.ty),
            e.names.ident(&field.name)
        );
        if let Some(storage) = e.fixed_array_storage(&field.ty) {
            line.push_str(&format!(" = {storage}"));
        }
        line.push(';');
        e.out.writeln(&line);
    }

    let members: Vec<MethodId> = class.constructor.into_iter().chain(class.methods.iter().copied()).collect();
    for id in members {
        let entry = e.program.method(id);
        e.out.blank_line();
        method(e, entry);
    }
    e.close();
}

fn method(e: &mut Emitter<'_, '_>, method: &MethodEntry) {
    let frame = e.names.frame(e.program, method.id);
    let params: Vec<String> = method
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} {}", type_name(e, &p.ty), frame.param(i as u32)))
        .collect();

    let mut header = format!("{} ", method.visibility.as_str());
    if method.kind == MethodKind::Constructor {
        header.push_str(&e.class_name(method.owner));
    } else {
        if method.is_static() {
            header.push_str("static ");
        }
        header.push_str(match method.virtuality {
            Virtuality::None => "",
            Virtuality::Virtual => "virtual ",
            Virtuality::Override => "override ",
            Virtuality::Abstract => "abstract ",
        });
        header.push_str(&format!("{} {}", type_name(e, &method.return_type), e.names.method(method.id)));
    }
    header.push_str(&format!("({})", params.join(", ")));

    if method.virtuality == Virtuality::Abstract {
        e.out.writeln(&format!("{header};"));
        return;
    }
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
    fn jagged_and_fixed_arrays() {
        let program = Program::new();
        let lowering = Lowering::new(&program, Vec::new());
        let e = Emitter::new(Target::CSharp, &lowering, Vec::new());
        assert_eq!(new_array(&e, &Type::Int, "n"), "new int[n]");
        assert_eq!(new_array(&e, &Type::array(Type::Int, None), "n"), "new int[n][]");
        assert_eq!(
            new_array(&e, &Type::array(Type::Byte, Some(4)), "2"),
            "Enumerable.Range(0, 2).Select(_ => new byte[4]).ToArray()"
        );
        assert_eq!(type_name(&e, &Type::array_ref(Type::String, true)), "string[]");
    }
}
