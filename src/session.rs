//! One compilation from source files to written output.

use std::fs;
use std::path::PathBuf;

use bumpalo::Bump;

use portc_codegen::OutputFile;
use portc_core::{CompileError, Diagnostic, SourceMap};
use portc_lowering::Lowering;
use portc_parser::{ParseSession, Script};

use crate::error::{Error, Result};
use crate::options::Options;

/// A source file and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub text: String,
}

impl Input {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Everything an in-memory compilation produced.
#[derive(Debug)]
pub struct Compilation {
    /// Files and macro expansions seen, for rendering diagnostics.
    pub sources: SourceMap,
    pub warnings: Vec<Diagnostic>,
    pub result: std::result::Result<Vec<OutputFile>, CompileError>,
}

impl Compilation {
    pub fn rendered_warnings(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.render(&self.sources)).collect()
    }

    pub fn rendered_error(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .map(|e| e.to_diagnostic().render(&self.sources))
    }
}

/// Outcome of a successful [`Session::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub warnings: Vec<String>,
    pub written: Vec<PathBuf>,
}

/// Drives parse, resolve, lowering and generation for fixed [`Options`].
#[derive(Debug, Clone)]
pub struct Session {
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Read, compile and write; the whole command-line pipeline.
    pub fn run(&self) -> Result<Report> {
        let inputs = self.read_inputs()?;
        let Compilation {
            sources,
            warnings,
            result,
        } = self.compile(&inputs);
        let warnings: Vec<String> = warnings.iter().map(|w| w.render(&sources)).collect();
        match result {
            Ok(files) => {
                let written = self.write(&files)?;
                Ok(Report { warnings, written })
            }
            Err(error) => {
                let rendered = error.to_diagnostic().render(&sources);
                Err(Error::Compile {
                    error,
                    rendered,
                    warnings,
                })
            }
        }
    }

    pub fn read_inputs(&self) -> Result<Vec<Input>> {
        self.options
            .inputs
            .iter()
            .map(|path| {
                let text = fs::read_to_string(path).map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(Input::new(path.display().to_string(), text))
            })
            .collect()
    }

    /// Compile `inputs`, in order, without touching the file system except
    /// to load binary resources.
    #[cfg_attr(feature = "profiling", profiling::function)]
    #[tracing::instrument(level = "debug", skip_all, fields(inputs = inputs.len(), target = %self.options.target))]
    pub fn compile(&self, inputs: &[Input]) -> Compilation {
        let arena = Bump::new();
        let mut parser = ParseSession::new(&arena, self.options.defines.clone());
        let mut scripts = Vec::with_capacity(inputs.len());
        let mut failure = None;
        for input in inputs {
            match parser.parse_file(&input.name, &input.text) {
                Ok(script) => scripts.push(script),
                Err(error) => {
                    failure = Some(CompileError::from(error));
                    break;
                }
            }
        }
        let sources = parser.into_sources();

        let (warnings, result) = match failure {
            Some(error) => (Vec::new(), Err(error)),
            None => self.generate(&scripts),
        };
        tracing::debug!(warnings = warnings.len(), ok = result.is_ok(), "compiled");
        Compilation {
            sources,
            warnings,
            result,
        }
    }

    fn generate(&self, scripts: &[Script<'_>]) -> (Vec<Diagnostic>, std::result::Result<Vec<OutputFile>, CompileError>) {
        let program = match portc_resolver::resolve(scripts) {
            Ok(program) => program,
            Err(failure) => return (Vec::new(), Err(failure.into())),
        };
        let warnings = program.warnings().to_vec();
        let lowering = Lowering::new(&program, self.options.include_dirs.clone());
        let files = portc_codegen::generate(&program, &lowering, self.options.target, &self.options.gen_options());
        (warnings, files.map_err(CompileError::from))
    }

    /// Write generated files, creating their directories.
    pub fn write(&self, files: &[OutputFile]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            if let Some(dir) = file.path.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir).map_err(|source| Error::Write {
                        path: dir.to_path_buf(),
                        source,
                    })?;
                }
            }
            fs::write(&file.path, &file.contents).map_err(|source| Error::Write {
                path: file.path.clone(),
                source,
            })?;
            tracing::debug!(path = %file.path.display(), bytes = file.contents.len(), "written");
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portc_codegen::Target;
    use portc_core::DefineSet;

    fn compile(target: Target, defines: &[&str], inputs: &[Input]) -> Compilation {
        let mut options = Options::new(target, "out", Vec::new());
        options.defines = DefineSet::with_symbols(defines.iter().copied()).unwrap();
        Session::new(options).compile(inputs)
    }

    #[test]
    fn files_share_one_program() {
        let compilation = compile(
            Target::JavaScript,
            &[],
            &[
                Input::new("a.pc", "public class A { public static int F() { return B.G(); } }"),
                Input::new("b.pc", "public class B { public static int G() { return 1; } }"),
            ],
        );
        let files = compilation.result.unwrap();
        assert!(files[0].contents.contains("return B.G();"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let compilation = compile(
            Target::C99,
            &[],
            &[
                Input::new("good.pc", "class A { }"),
                Input::new("bad.pc", "class B {\n  int x\n}"),
            ],
        );
        let rendered = compilation.rendered_error().unwrap();
        assert!(rendered.starts_with("bad.pc("), "{rendered}");
        assert!(rendered.contains("): ERROR: "), "{rendered}");
    }

    #[test]
    fn resolve_errors_name_the_method() {
        let compilation = compile(
            Target::C99,
            &[],
            &[Input::new("a.pc", "class P {\n  static int F() {\n    return missing;\n  }\n}")],
        );
        let rendered = compilation.rendered_error().unwrap();
        assert!(rendered.starts_with("a.pc(3): ERROR: "), "{rendered}");
        assert!(rendered.contains("\n   in method "), "{rendered}");
    }

    #[test]
    fn defines_select_code() {
        let source = "class P {
#if FAST
    static int F() { return 1; }
#else
    static int F() { return 2; }
#endif
}";
        let fast = compile(Target::C99, &["FAST"], &[Input::new("a.pc", source)]);
        assert!(fast.result.unwrap()[0].contents.contains("return 1;"));
        let slow = compile(Target::C99, &[], &[Input::new("a.pc", source)]);
        assert!(slow.result.unwrap()[0].contents.contains("return 2;"));
    }

    #[test]
    fn warnings_do_not_stop_generation() {
        let compilation = compile(
            Target::Java,
            &[],
            &[Input::new("a.pc", "class P {\n  static int F() {\n    return 1;\n    return 2;\n  }\n}")],
        );
        let warnings = compilation.rendered_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("a.pc(4): WARNING: "), "{}", warnings[0]);
        let files = compilation.result.unwrap();
        assert!(!files[0].contents.contains("return 2;"));
    }
}
