//! Block scopes for a method body being resolved.
//!
//! Tracks local variables and local constants by name. Handles:
//! - Nested block scopes (if/while/for bodies, switch sections)
//! - Shadowing of outer declarations, restored on scope exit
//! - Duplicate detection within one block

use rustc_hash::FxHashMap;

use portc_core::{ConstId, LocalId, ResolveError, Span, Type};

/// What a name bound in a block scope refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalBinding {
    Variable { id: LocalId, ty: Type },
    Constant(ConstId),
}

#[derive(Debug, Clone)]
struct ScopedName {
    binding: LocalBinding,
    depth: u32,
}

/// The block scope chain of one method.
#[derive(Debug, Default)]
pub struct LocalScope {
    names: FxHashMap<String, ScopedName>,
    depth: u32,
    /// (depth at which the shadowing happened, name, shadowed entry)
    shadowed: Vec<(u32, String, ScopedName)>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave the current block, dropping its names and restoring shadowed ones.
    pub fn pop_scope(&mut self) {
        let depth = self.depth;
        self.names.retain(|_, entry| entry.depth < depth);
        while let Some((shadowing_depth, _, _)) = self.shadowed.last() {
            if *shadowing_depth < depth {
                break;
            }
            if let Some((_, name, entry)) = self.shadowed.pop() {
                self.names.insert(name, entry);
            }
        }
        self.depth = depth.saturating_sub(1);
    }

    /// Bind `name` in the innermost block.
    ///
    /// Fails with `DuplicateSymbol` if the innermost block already binds it.
    pub fn declare(&mut self, name: &str, binding: LocalBinding, span: Span) -> Result<(), ResolveError> {
        let entry = ScopedName {
            binding,
            depth: self.depth,
        };
        if let Some(previous) = self.names.insert(name.to_string(), entry) {
            if previous.depth == self.depth {
                return Err(ResolveError::duplicate(span, name));
            }
            self.shadowed.push((self.depth, name.to_string(), previous));
        }
        Ok(())
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&LocalBinding> {
        self.names.get(name).map(|entry| &entry.binding)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use portc_core::ResolveErrorKind;

    use super::*;

    fn var(index: u32) -> LocalBinding {
        LocalBinding::Variable {
            id: LocalId(index),
            ty: Type::Int,
        }
    }

    #[test]
    fn inner_scope_shadows_and_restores() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("x", var(0), Span::default()).unwrap();

        scope.push_scope();
        scope.declare("x", var(1), Span::default()).unwrap();
        assert_eq!(scope.lookup("x"), Some(&var(1)));

        scope.pop_scope();
        assert_eq!(scope.lookup("x"), Some(&var(0)));

        scope.pop_scope();
        assert_eq!(scope.lookup("x"), None);
    }

    #[test]
    fn duplicate_in_same_block_is_rejected() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("x", var(0), Span::default()).unwrap();
        let err = scope.declare("x", var(1), Span::default()).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::DuplicateSymbol);
    }

    #[test]
    fn sibling_blocks_reuse_names() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("i", var(0), Span::default()).unwrap();
        scope.pop_scope();
        scope.push_scope();
        scope.declare("i", var(1), Span::default()).unwrap();
        assert_eq!(scope.lookup("i"), Some(&var(1)));
        assert_eq!(scope.depth(), 1);
    }

    #[test]
    fn constants_share_the_namespace() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("N", LocalBinding::Constant(ConstId(3)), Span::default()).unwrap();
        assert!(scope.declare("N", var(0), Span::default()).is_err());
    }
}
