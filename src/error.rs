//! Driver errors.
//!
//! ```text
//! Error
//! ├── Usage     - bad command line: no inputs, unknown target, reserved -D symbol
//! ├── Read      - an input file could not be read
//! ├── Write     - an output file could not be written
//! └── Compile   - parse, resolve or resource error, rendered against the sources
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use portc_codegen::UnknownTarget;
use portc_core::{CompileError, ReservedSymbol};

/// A command line that cannot start a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("no input files")]
    NoInputs,

    #[error(transparent)]
    UnknownTarget(#[from] UnknownTarget),

    #[error(transparent)]
    ReservedSymbol(#[from] ReservedSymbol),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `rendered` is the diagnostic as printed; `warnings` were reported
    /// before the error stopped compilation.
    #[error("{rendered}")]
    Compile {
        error: CompileError,
        rendered: String,
        warnings: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_keep_their_message() {
        let err: Error = UsageError::from(ReservedSymbol("false".into())).into();
        assert_eq!(err.to_string(), "symbol false is reserved and cannot be defined");
        let err: Error = UsageError::from(UnknownTarget("go".into())).into();
        assert_eq!(
            err.to_string(),
            "unknown target language go, expected one of c, c99, cs, java, js"
        );
    }
}
