//! Command-line arguments and the options they resolve to.

use std::path::PathBuf;

use clap::Parser;

use portc_codegen::{GenOptions, Target};
use portc_core::DefineSet;

use crate::error::UsageError;

/// Compile portc sources to C, C#, Java or JavaScript.
#[derive(Debug, Clone, Parser)]
#[command(name = "portc", version, about)]
pub struct Cli {
    /// Output language: c, c99, cs, java or js
    #[arg(short = 'l', long = "lang", value_name = "LANG")]
    pub lang: String,

    /// Output file, or output directory for Java
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Namespace (C#) or package (Java) of the generated code
    #[arg(short, long, value_name = "NAME")]
    pub namespace: Option<String>,

    /// Define a preprocessor symbol
    #[arg(short = 'D', value_name = "SYMBOL")]
    pub defines: Vec<String>,

    /// Directory searched for binary resources, in order
    #[arg(short = 'I', value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Log compiler progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Source files, compiled in order
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

impl Cli {
    /// Check the arguments and build the compilation's options.
    pub fn into_options(self) -> Result<Options, UsageError> {
        if self.inputs.is_empty() {
            return Err(UsageError::NoInputs);
        }
        Ok(Options {
            target: self.lang.parse()?,
            defines: DefineSet::with_symbols(self.defines)?,
            output: self.output,
            namespace: self.namespace,
            include_dirs: self.include_dirs,
            inputs: self.inputs,
        })
    }
}

/// Everything one compilation needs to know; fixed once built.
#[derive(Debug, Clone)]
pub struct Options {
    pub target: Target,
    pub output: PathBuf,
    pub namespace: Option<String>,
    pub defines: DefineSet,
    pub include_dirs: Vec<PathBuf>,
    pub inputs: Vec<PathBuf>,
}

impl Options {
    /// Options for compiling `inputs` to `target`, with nothing defined.
    pub fn new(target: Target, output: impl Into<PathBuf>, inputs: Vec<PathBuf>) -> Self {
        Self {
            target,
            output: output.into(),
            namespace: None,
            defines: DefineSet::new(),
            include_dirs: Vec::new(),
            inputs,
        }
    }

    pub fn gen_options(&self) -> GenOptions {
        GenOptions {
            namespace: self.namespace.clone(),
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, UsageError> {
        let cli = Cli::try_parse_from(std::iter::once("portc").chain(args.iter().copied()))
            .unwrap_or_else(|e| panic!("{e}"));
        cli.into_options()
    }

    #[test]
    fn full_command_line() {
        let options = parse(&[
            "-l", "cs", "-o", "out.cs", "-n", "Game", "-D", "DEBUG", "-I", "a", "-I", "b", "x.pc", "y.pc",
        ])
        .unwrap();
        assert_eq!(options.target, Target::CSharp);
        assert_eq!(options.namespace.as_deref(), Some("Game"));
        assert!(options.defines.contains("DEBUG"));
        assert!(options.defines.contains("true"));
        assert_eq!(options.include_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(options.inputs, vec![PathBuf::from("x.pc"), PathBuf::from("y.pc")]);
    }

    #[test]
    fn usage_errors() {
        assert_eq!(parse(&["-l", "c", "-o", "out.c"]).unwrap_err(), UsageError::NoInputs);
        assert!(matches!(
            parse(&["-l", "rust", "-o", "out", "a.pc"]).unwrap_err(),
            UsageError::UnknownTarget(_)
        ));
        assert!(matches!(
            parse(&["-l", "js", "-o", "out.js", "-D", "false", "a.pc"]).unwrap_err(),
            UsageError::ReservedSymbol(_)
        ));
    }

    #[test]
    fn missing_language_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["portc", "-o", "out.c", "a.pc"]).is_err());
    }
}
