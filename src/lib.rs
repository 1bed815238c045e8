//! portc: a source-to-source compiler.
//!
//! Compiles a small statically typed, class-based language to C89, C99, C#,
//! Java and JavaScript. The pipeline is split across the workspace crates:
//!
//! 1. [`portc_parser`] preprocesses, expands macros and parses every input
//!    into one arena
//! 2. [`portc_resolver`] checks the scripts and builds a typed [`Program`]
//! 3. [`portc_lowering`] answers layout, dispatch, constant and resource
//!    questions about the program
//! 4. [`portc_codegen`] writes the program out for a [`Target`]
//!
//! This crate ties them together behind a [`Session`] and hosts the `portc`
//! binary.
//!
//! ```no_run
//! use portc::{Options, Session, Target};
//!
//! let options = Options::new(Target::C99, "out.c", vec!["game.pc".into()]);
//! let report = Session::new(options).run()?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! # Ok::<(), portc::Error>(())
//! ```

pub mod error;
pub mod options;
pub mod session;

pub use error::{Error, Result, UsageError};
pub use options::{Cli, Options};
pub use session::{Compilation, Input, Report, Session};

pub use portc_codegen::{GenOptions, OutputFile, Target, UnknownTarget};
pub use portc_core::{CompileError, DefineSet, Diagnostic, Severity, SourceMap};
pub use portc_registry::Program;
