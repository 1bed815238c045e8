//! Target identifiers.
//!
//! Source names are kept where the target allows them. Names that collide
//! with a target keyword get a trailing underscore, locals are renamed so
//! every local of a method has its own name, and on targets without
//! overloading (C and JavaScript) overloaded method names get a suffix
//! built from their parameter types.

use rustc_hash::{FxHashMap, FxHashSet};

use portc_core::{ClassId, ConstId, ConstOwner, ConstValue, LocalId, MethodId, MethodKind, ResourceId, Type};
use portc_registry::Program;

use crate::Target;

const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum",
    "extern", "float", "for", "goto", "if", "inline", "int", "long", "register", "restrict", "return",
    "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while", "bool", "true", "false", "NULL", "self", "base_self", "abort", "calloc",
    "memset", "strcmp", "strlen", "int64_t",
];

const CSHARP_RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new", "null",
    "object", "operator", "out", "override", "params", "private", "protected", "public", "readonly",
    "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static", "string", "struct",
    "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe",
    "ushort", "using", "virtual", "void", "volatile", "while", "System",
];

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null", "var", "java",
];

const JS_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "let", "static", "implements", "interface",
    "package", "private", "protected", "public", "await", "arguments", "eval", "undefined", "NaN",
    "Infinity", "Object", "Math", "Array", "Error",
];

/// Identifiers shared by a whole output.
pub(crate) struct Names {
    target: Target,
    methods: Vec<String>,
    resources: Vec<String>,
}

/// Parameter, local and local-constant names of one method.
#[derive(Debug, Clone, Default)]
pub(crate) struct Frame {
    pub params: Vec<String>,
    pub locals: Vec<String>,
    pub consts: FxHashMap<ConstId, String>,
}

impl Frame {
    pub fn param(&self, index: u32) -> &str {
        self.params.get(index as usize).map_or("", String::as_str)
    }

    pub fn local(&self, id: LocalId) -> &str {
        self.locals.get(id.index()).map_or("", String::as_str)
    }
}

impl Names {
    pub fn new(program: &Program, target: Target) -> Self {
        let mut names = Self {
            target,
            methods: Vec::with_capacity(program.methods().len()),
            resources: Vec::with_capacity(program.resources().len()),
        };
        let overloaded = if matches!(target, Target::CSharp | Target::Java) {
            FxHashSet::default()
        } else {
            overloaded_names(program)
        };
        for method in program.methods() {
            let mut name = names.ident(&method.name);
            if overloaded.contains(&(root_of(program, method.owner), method.name.as_str())) && !method.params.is_empty() {
                for param in &method.params {
                    name.push('_');
                    name.push_str(&type_tag(program, &param.ty));
                }
            }
            names.methods.push(name);
        }

        let mut used = FxHashSet::default();
        for resource in program.resources() {
            let base: String = resource
                .path
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            names.resources.push(name);
        }
        names
    }

    fn reserved(&self) -> &'static [&'static str] {
        match self.target {
            Target::C89 | Target::C99 => C_RESERVED,
            Target::CSharp => CSHARP_RESERVED,
            Target::Java => JAVA_RESERVED,
            Target::JavaScript => JS_RESERVED,
        }
    }

    pub fn ident(&self, name: &str) -> String {
        if self.reserved().contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    pub fn method(&self, id: MethodId) -> &str {
        &self.methods[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> &str {
        &self.resources[id.index()]
    }

    /// Names for the parameters, locals and array constants of `method`.
    pub fn frame(&self, program: &Program, method: MethodId) -> Frame {
        let entry = program.method(method);
        let mut used = FxHashSet::default();
        let mut unique = |name: &str| {
            let base = self.ident(name);
            let mut candidate = base.clone();
            let mut n = 2;
            while !used.insert(candidate.clone()) {
                candidate = format!("{base}{n}");
                n += 1;
            }
            candidate
        };

        let params = entry.params.iter().map(|p| unique(&p.name)).collect();
        let locals = entry.locals.iter().map(|l| unique(&l.name)).collect();
        let consts = program
            .consts()
            .iter()
            .filter(|c| c.owner == ConstOwner::Method(method))
            .filter(|c| matches!(c.value, Some(ConstValue::Array(_))))
            .map(|c| (c.id, unique(&c.name)))
            .collect();
        Frame { params, locals, consts }
    }
}

fn root_of(program: &Program, class: ClassId) -> ClassId {
    program.ancestors(class).last().unwrap_or(class)
}

/// `(hierarchy root, name)` pairs declared with more than one signature.
fn overloaded_names(program: &Program) -> FxHashSet<(ClassId, &str)> {
    let mut signatures: FxHashMap<(ClassId, &str), FxHashSet<_>> = FxHashMap::default();
    for method in program.methods() {
        if method.kind == MethodKind::Constructor {
            continue;
        }
        signatures
            .entry((root_of(program, method.owner), method.name.as_str()))
            .or_default()
            .insert(method.signature);
    }
    signatures
        .into_iter()
        .filter(|(_, sigs)| sigs.len() > 1)
        .map(|(key, _)| key)
        .collect()
}

fn type_tag(program: &Program, ty: &Type) -> String {
    match ty {
        Type::Array { elem, .. } => format!("{}Array", type_tag(program, elem)),
        Type::Pointer { target, .. } => type_tag(program, target),
        other => other.display(program).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use portc_core::DefineSet;
    use portc_parser::ParseSession;

    fn resolve(source: &str) -> Program {
        let arena = Bump::new();
        let mut session = ParseSession::new(&arena, DefineSet::new());
        let script = session.parse_file("test.pc", source).unwrap();
        portc_resolver::resolve(&[script]).unwrap()
    }

    fn method_names(program: &Program, target: Target) -> Vec<String> {
        let names = Names::new(program, target);
        program.methods().iter().map(|m| names.method(m.id).to_string()).collect()
    }

    const OVERLOADS: &str = "
        class A {
            public int F(int x) { return x; }
            public long F(long x) { return x; }
            public void G() { }
        }
    ";

    #[test]
    fn overloads_get_type_suffixes_without_native_overloading() {
        let program = resolve(OVERLOADS);
        assert_eq!(method_names(&program, Target::C99), vec!["F_int", "F_long", "G"]);
        assert_eq!(method_names(&program, Target::JavaScript), vec!["F_int", "F_long", "G"]);
        assert_eq!(method_names(&program, Target::Java), vec!["F", "F", "G"]);
    }

    #[test]
    fn keywords_are_escaped() {
        let program = Program::new();
        assert_eq!(Names::new(&program, Target::C89).ident("self"), "self_");
        assert_eq!(Names::new(&program, Target::Java).ident("boolean"), "boolean_");
        assert_eq!(Names::new(&program, Target::JavaScript).ident("let"), "let_");
        assert_eq!(Names::new(&program, Target::CSharp).ident("value"), "value");
    }

    #[test]
    fn locals_are_unique_within_a_method() {
        let program = resolve(
            "class A {
                public static int F(int x) {
                    int y = 0;
                    { int x2 = 1; y += x2; }
                    { int y2 = 2; y += y2; }
                    for (int i = 0; i < 2; i++) { y += i; }
                    for (int i = 0; i < 2; i++) { y += i; }
                    return x + y;
                }
            }",
        );
        let f = program.methods()[0].id;
        let frame = Names::new(&program, Target::C99).frame(&program, f);
        assert_eq!(frame.params, vec!["x"]);
        assert_eq!(frame.locals, vec!["y", "x2", "y2", "i", "i2"]);
    }
}
