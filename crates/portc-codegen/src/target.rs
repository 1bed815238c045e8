//! The closed set of output languages.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    C89,
    C99,
    CSharp,
    Java,
    JavaScript,
}

/// A `-l` value that names no target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target language {0}, expected one of c, c99, cs, java, js")]
pub struct UnknownTarget(pub String);

impl Target {
    pub const ALL: [Target; 5] = [
        Target::C89,
        Target::C99,
        Target::CSharp,
        Target::Java,
        Target::JavaScript,
    ];

    /// The command-line spelling.
    pub fn flag(self) -> &'static str {
        match self {
            Target::C89 => "c",
            Target::C99 => "c99",
            Target::CSharp => "cs",
            Target::Java => "java",
            Target::JavaScript => "js",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.flag() == flag)
    }

    pub fn is_c(self) -> bool {
        matches!(self, Target::C89 | Target::C99)
    }

    /// Whether opening braces go on their own line.
    pub(crate) fn allman(self) -> bool {
        matches!(self, Target::C89 | Target::C99 | Target::CSharp)
    }
}

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_flag(s).ok_or_else(|| UnknownTarget(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip() {
        for target in Target::ALL {
            assert_eq!(target.flag().parse::<Target>(), Ok(target));
        }
    }

    #[test]
    fn unknown_flag() {
        assert_eq!("cpp".parse::<Target>(), Err(UnknownTarget("cpp".into())));
    }
}
