//! Code generators for portc.
//!
//! Each [`Target`] turns a resolved [`Program`] into source text. Generators
//! only read the program and ask the [`Lowering`] contract for dispatch
//! slots, folded constants and resource bytes; they never resolve names or
//! evaluate expressions themselves, so output is deterministic for a given
//! program.
//!
//! | Target | Output |
//! |---|---|
//! | C89, C99 | one `.c` file: structs, explicit vtables, constructor functions |
//! | C# | one file, optionally inside a namespace |
//! | Java | one `Name.java` per type in the output directory |
//! | JavaScript | one strict-mode script |
//!
//! ## Modules
//!
//! - [`target`]: the closed set of output languages
//! - `emitter`: shared naming, literal and layout state
//! - `expr` and `stmt`: IR to source text, shared by every target
//! - `c`, `csharp`, `java`, `js`: per-target declarations

mod c;
mod csharp;
mod emitter;
mod expr;
mod java;
mod js;
mod literal;
mod names;
mod stmt;
pub mod target;
mod writer;

pub use target::{Target, UnknownTarget};

use std::path::PathBuf;

use portc_core::ResourceError;
use portc_lowering::Lowering;
use portc_registry::Program;

use emitter::Emitter;

/// Settings of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenOptions {
    /// Namespace for C#, package for Java; ignored by C and JavaScript.
    pub namespace: Option<String>,
    /// Output file, or output directory for Java.
    pub output: PathBuf,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Generate `program` for `target`.
///
/// Fails only when a `BinaryResource` path cannot be read.
#[tracing::instrument(level = "debug", skip_all, fields(target = %target))]
pub fn generate(
    program: &Program,
    lowering: &Lowering<'_>,
    target: Target,
    options: &GenOptions,
) -> Result<Vec<OutputFile>, ResourceError> {
    let resources = program
        .resources()
        .iter()
        .map(|r| lowering.resource_bytes_of(&r.path, r.span))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(resources = resources.len(), "resources loaded");

    let mut emitter = Emitter::new(target, lowering, resources);
    let namespace = options.namespace.as_deref();
    let files = match target {
        Target::C89 | Target::C99 => vec![OutputFile {
            path: options.output.clone(),
            contents: c::generate(&mut emitter),
        }],
        Target::CSharp => vec![OutputFile {
            path: options.output.clone(),
            contents: csharp::generate(&mut emitter, namespace),
        }],
        Target::Java => java::generate(&mut emitter, namespace)
            .into_iter()
            .map(|(name, contents)| OutputFile {
                path: options.output.join(format!("{name}.java")),
                contents,
            })
            .collect(),
        Target::JavaScript => vec![OutputFile {
            path: options.output.clone(),
            contents: js::generate(&mut emitter),
        }],
    };
    tracing::debug!(files = files.len(), "output generated");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use portc_core::DefineSet;
    use portc_parser::ParseSession;
    use pretty_assertions::assert_eq;

    const SHAPES: &str = "
        public abstract class Shape {
            public abstract int Area();
        }
        public class Square : Shape {
            private int side;
            public override int Area() { return side * side; }
        }";

    fn generate_source(source: &str, target: Target, namespace: Option<&str>) -> Vec<OutputFile> {
        let arena = Bump::new();
        let mut session = ParseSession::new(&arena, DefineSet::new());
        let script = session.parse_file("test.pc", source).unwrap();
        let program = portc_resolver::resolve(&[script]).unwrap();
        let lowering = Lowering::new(&program, Vec::new());
        let options = GenOptions {
            namespace: namespace.map(str::to_string),
            output: PathBuf::from("out"),
        };
        generate(&program, &lowering, target, &options).unwrap()
    }

    fn single(source: &str, target: Target) -> String {
        let mut files = generate_source(source, target, None);
        assert_eq!(files.len(), 1);
        files.remove(0).contents
    }

    #[test]
    fn javascript_class() {
        let out = single(
            "public class Counter {
                private int count;
                public void Add(int n) { count += n; }
                public int Get() { return count; }
            }",
            Target::JavaScript,
        );
        let expected = "\
// Generated by portc. Do not edit.
\"use strict\";

class Counter {
    constructor() {
        this.count = 0;
    }

    Add(n) {
        this.count += n;
    }

    Get() {
        return this.count;
    }
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn c99_virtual_dispatch() {
        let out = single(SHAPES, Target::C99);
        for line in [
            "#include <stdint.h>",
            "typedef struct Shape_Vtbl Shape_Vtbl;",
            "    int (*Area)(Shape *self);",
            "    const void *vtbl;",
            "static int Square_Area_impl(Shape *base_self)",
            "    Square *self = (Square *) base_self;",
            "    return self->side * self->side;",
            "int Shape_Area(Shape *self)",
            "    return ((const Shape_Vtbl *) self->vtbl)->Area(self);",
            "static const Square_Vtbl Square_vtbl = {",
            "    Square_Area_impl",
            "Square *Square_New(void)",
            "    self->vtbl = &Square_vtbl;",
        ] {
            assert!(out.contains(line), "missing {line:?} in\n{out}");
        }
        assert!(!out.contains("Shape *Shape_New"));
    }

    #[test]
    fn c89_hoists_locals_and_avoids_line_comments() {
        let out = single(
            "public class P { public static int F(bool b) { int x = 1; if (b) { int y = 2; x = y; } return x; } }",
            Target::C89,
        );
        assert!(!out.contains("//"), "{out}");
        assert!(out.contains("int P_F(int b)"), "{out}");
        let body = &out[out.find("int P_F(int b)").unwrap()..];
        let x = body.find("    int x;").unwrap();
        let y = body.find("    int y;").unwrap();
        let assign = body.find("x = 1;").unwrap();
        assert!(x < assign && y < assign, "{body}");
    }

    #[test]
    fn c_storage_follows_layout() {
        let source = "public delegate int Scorer(int v);
            public class Board {
                private int[6] grid;
                private Board next;
                private Scorer scorer;
                public static int Sum(int[] values) { int[4] cells; cells[0] = values[0]; return cells[0]; }
            }";
        let c99 = single(source, Target::C99);
        for line in [
            "    int grid[6];",
            "    Board *next;",
            "    Scorer scorer;",
            "int Board_Sum(int *values)",
            "    int cells[4] = { 0 };",
        ] {
            assert!(c99.contains(line), "missing {line:?} in\n{c99}");
        }
        let c89 = single(source, Target::C89);
        assert!(c89.contains("    memset(cells, 0, sizeof(cells));"), "{c89}");
    }

    #[test]
    fn csharp_namespace_and_overrides() {
        let files = generate_source(SHAPES, Target::CSharp, Some("Game"));
        let out = &files[0].contents;
        assert!(out.contains("namespace Game\n{"), "{out}");
        assert!(out.contains("    public abstract class Shape\n    {"), "{out}");
        assert!(out.contains("public abstract int Area();"), "{out}");
        assert!(out.contains("public override int Area()"), "{out}");
        assert!(out.contains("public class Square : Shape"), "{out}");
    }

    #[test]
    fn java_writes_one_file_per_type() {
        let files = generate_source(SHAPES, Target::Java, Some("game"));
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("out/Shape.java"), PathBuf::from("out/Square.java")]);
        let square = &files[1].contents;
        assert!(square.starts_with("// Generated by portc. Do not edit.\npackage game;\n"));
        assert!(square.contains("public class Square extends Shape {"), "{square}");
        assert!(square.contains("    @Override\n    public int Area() {"), "{square}");
    }

    #[test]
    fn enums_follow_folded_values() {
        let source = "public enum Color { Red, Green = 5, Blue }";
        let c = single(source, Target::C99);
        assert!(c.contains("    Color_Green = 5,\n    Color_Blue = 6\n} Color;"), "{c}");
        let js = single(source, Target::JavaScript);
        assert!(js.contains("const Color = Object.freeze({ Red: 0, Green: 5, Blue: 6 });"), "{js}");
        let java = generate_source(source, Target::Java, None);
        assert!(java[0].contents.contains("int Blue = 6;"));
    }

    #[test]
    fn missing_resource_is_an_error() {
        let arena = Bump::new();
        let mut session = ParseSession::new(&arena, DefineSet::new());
        let script = session
            .parse_file(
                "test.pc",
                "class P { static void F() { const byte[] d = BinaryResource(\"no/such/file.bin\"); } }",
            )
            .unwrap();
        let program = portc_resolver::resolve(&[script]).unwrap();
        let lowering = Lowering::new(&program, Vec::new());
        let err = generate(&program, &lowering, Target::C99, &GenOptions::default()).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
    }
}
