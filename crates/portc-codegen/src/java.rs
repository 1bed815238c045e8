//! Java output: one compilation unit per generated type.
//!
//! Enums become interfaces of `int` constants and delegates become
//! single-method interfaces invoked through `invoke`.

use portc_core::{ClassEntry, ConstValue, MethodEntry, MethodId, MethodKind, Type, Virtuality};

use crate::emitter::{Emitter, RESOURCE_HOLDER};
use crate::literal;

pub(crate) fn type_name(e: &Emitter<'_, '_>, ty: &Type) -> String {
    match ty {
        Type::Void => "void".into(),
        Type::Bool => "boolean".into(),
        Type::Byte => "byte".into(),
        Type::Int | Type::Enum(_) => "int".into(),
        Type::Long => "long".into(),
        Type::Float => "float".into(),
        Type::Double => "double".into(),
        Type::String => "String".into(),
        Type::Class(id) => e.class_name(*id),
        Type::Delegate(id) => e.names.ident(&e.program.delegate(*id).name),
        Type::Array { elem, .. } => format!("{}[]", type_name(e, elem)),
        Type::Pointer { target, .. } => type_name(e, target),
        Type::Null => "Object".into(),
    }
}

/// `new T[len]` with every fixed inner dimension allocated as well.
pub(crate) fn new_array(e: &Emitter<'_, '_>, elem: &Type, len: &str) -> String {
    let mut dims = format!("[{len}]");
    let mut base = elem;
    while let Type::Array { elem, len: Some(n) } = base {
        dims.push_str(&format!("[{n}]"));
        base = elem;
    }
    let name = type_name(e, base);
    match name.find('[') {
        Some(at) => format!("new {}{dims}{}", &name[..at], &name[at..]),
        None => format!("new {name}{dims}"),
    }
}

/// Every compilation unit as `(type name, contents)`.
pub(crate) fn generate(e: &mut Emitter<'_, '_>, package: Option<&str>) -> Vec<(String, String)> {
    let mut units = Vec::new();

    for entry in e.program.enums() {
        let name = e.enum_name(entry.id);
        start_unit(e, package);
        let access = if entry.is_public { "public " } else { "" };
        e.open(&format!("{access}interface {name}"));
        for (i, value) in entry.values.iter().enumerate() {
            let line = format!("int {} = {};", e.names.ident(&value.name), e.enum_value(entry.id, i as u32));
            e.out.writeln(&line);
        }
        e.close();
        units.push((name, e.take_output()));
    }

    for delegate in e.program.delegates() {
        let name = e.names.ident(&delegate.name);
        start_unit(e, package);
        let access = if delegate.is_public { "public " } else { "" };
        let params: Vec<String> = delegate
            .params
            .iter()
            .map(|p| format!("{} {}", type_name(e, &p.ty), e.names.ident(&p.name)))
            .collect();
        let line = format!("{} invoke({});", type_name(e, &delegate.return_type), params.join(", "));
        e.out.writeln("@FunctionalInterface");
        e.open(&format!("{access}interface {name}"));
        e.out.writeln(&line);
        e.close();
        units.push((name, e.take_output()));
    }

    for class in e.program.classes() {
        let name = e.class_name(class.id);
        start_unit(e, package);
        class_definition(e, class);
        units.push((name, e.take_output()));
    }

    if !e.program.resources().is_empty() {
        start_unit(e, package);
        e.open(&format!("final class {RESOURCE_HOLDER}"));
        for resource in e.program.resources() {
            let rows = literal::byte_rows(e.target, &e.resources[resource.id.index()], 16);
            let name = e.names.resource(resource.id).to_string();
            e.out.writeln(&format!("static final byte[] {name} = {{"));
            e.out.indent();
            for (i, row) in rows.iter().enumerate() {
                let comma = if i + 1 < rows.len() { "," } else { "" };
                e.out.writeln(&format!("{row}{comma}"));
            }
            e.close_with("};");
        }
        e.out.blank_line();
        e.out.writeln(&format!("private {RESOURCE_HOLDER}() {{}}"));
        e.close();
        units.push((RESOURCE_HOLDER.to_string(), e.take_output()));
    }
    units
}

fn start_unit(e: &mut Emitter<'_, '_>, package: Option<&str>) {
    let header = e.comment("Generated by portc. Do not edit.");
    e.out.writeln(&header);
    if let Some(package) = package {
        e.out.writeln(&format!("package {package};"));
    }
    e.out.blank_line();
}

fn class_definition(e: &mut Emitter<'_, '_>, class: &ClassEntry) {
    let name = e.class_name(class.id);
    let mut header = String::new();
    if class.is_public {
        header.push_str("public ");
    }
    if class.is_static {
        header.push_str("final ");
    } else if class.is_abstract {
        header.push_str("abstract ");
    }
    header.push_str("class ");
    header.push_str(&name);
    if let Some(base) = class.base {
        header.push_str(&format!(" extends {}", e.class_name(base)));
    }
    e.open(&header);

    for &id in &class.consts {
        let entry = e.program.const_entry(id);
        let Some(value) = e.const_value(id) else {
            continue;
        };
        let value = match &value {
            ConstValue::Array(items) => {
                let elem = entry.ty.element_type().cloned().unwrap_or_default();
                e.array_literal(items, &elem)
            }
            value => e.constant(value, &entry.ty),
        };
        let line = format!(
            "{} static final {} {} = {value};",
            entry.visibility.as_str(),
            type_name(e, &entry.ty),
            e.names.ident(&entry.name)
        );
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

    if class.is_static {
        e.out.blank_line();
        e.out.writeln(&format!("private {name}() {{}}"));
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

    if method.virtuality == Virtuality::Override {
        e.out.writeln("@Override");
    }
    let mut header = format!("{} ", method.visibility.as_str());
    if method.kind == MethodKind::Constructor {
        header.push_str(&e.class_name(method.owner));
    } else {
        if method.is_static() {
            header.push_str("static ");
        }
        if method.virtuality == Virtuality::Abstract {
            header.push_str("abstract ");
        }
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
    fn arrays_allocate_fixed_dimensions() {
        let program = Program::new();
        let lowering = Lowering::new(&program, Vec::new());
        let e = Emitter::new(Target::Java, &lowering, Vec::new());
        assert_eq!(new_array(&e, &Type::Bool, "n"), "new boolean[n]");
        assert_eq!(new_array(&e, &Type::array(Type::Int, Some(4)), "3"), "new int[3][4]");
        assert_eq!(new_array(&e, &Type::array_ref(Type::Int, false), "n"), "new int[n][]");
        assert_eq!(type_name(&e, &Type::array(Type::String, Some(2))), "String[]");
    }
}
