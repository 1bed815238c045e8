//! Preprocessor symbol sets.

use rustc_hash::FxHashSet;

use crate::ReservedSymbol;

/// Symbol that is always defined.
pub const TRUE_SYMBOL: &str = "true";

/// The immutable set of symbols `#if` conditions are evaluated against.
///
/// `true` is always present; `true` and `false` cannot be defined by callers.
#[derive(Debug, Clone)]
pub struct DefineSet {
    symbols: FxHashSet<String>,
}

impl DefineSet {
    pub fn new() -> Self {
        let mut symbols = FxHashSet::default();
        symbols.insert(TRUE_SYMBOL.to_string());
        Self { symbols }
    }

    /// Build a set from user-supplied symbols.
    pub fn with_symbols<I, S>(symbols: I) -> Result<Self, ReservedSymbol>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for symbol in symbols {
            let symbol = symbol.into();
            if symbol == "true" || symbol == "false" {
                return Err(ReservedSymbol(symbol));
            }
            set.symbols.insert(symbol);
        }
        Ok(set)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for DefineSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_is_always_defined() {
        let set = DefineSet::new();
        assert!(set.contains("true"));
        assert!(!set.contains("false"));
    }

    #[test]
    fn user_symbols_are_added() {
        let set = DefineSet::with_symbols(["DEBUG", "WIN32"]).unwrap();
        assert!(set.contains("DEBUG"));
        assert!(set.contains("WIN32"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn reserved_symbols_are_rejected() {
        assert_eq!(
            DefineSet::with_symbols(["false"]).unwrap_err(),
            ReservedSymbol("false".to_string())
        );
        assert!(DefineSet::with_symbols(["true"]).is_err());
    }
}
