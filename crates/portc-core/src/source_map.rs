//! Source files and macro expansion records.

use crate::{ExpansionId, SourceId, Span};

/// A registered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
}

/// One macro invocation: the macro's name and where it was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub macro_name: String,
    pub call_site: Span,
}

/// Maps [`SourceId`]s to file names and [`ExpansionId`]s to invocation sites.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    expansions: Vec<Expansion>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input file and return its id.
    pub fn add_file(&mut self, name: impl Into<String>) -> SourceId {
        let id = SourceId(self.files.len() as u32);
        self.files.push(SourceFile { name: name.into() });
        id
    }

    /// The file name for `id`, or `<unknown>` if it was never registered.
    pub fn file_name(&self, id: SourceId) -> &str {
        self.files
            .get(id.0 as usize)
            .map(|f| f.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Record that `macro_name` was invoked at `call_site`.
    pub fn add_expansion(&mut self, macro_name: impl Into<String>, call_site: Span) -> ExpansionId {
        let id = ExpansionId::from_index(self.expansions.len());
        self.expansions.push(Expansion {
            macro_name: macro_name.into(),
            call_site,
        });
        id
    }

    pub fn expansion(&self, id: ExpansionId) -> Option<&Expansion> {
        self.expansions.get(id.index())
    }

    /// The chain of expansions that produced `span`, innermost first.
    pub fn expansion_trace(&self, span: Span) -> Vec<&Expansion> {
        let mut trace = Vec::new();
        let mut current = span.expansion;
        while let Some(id) = current {
            // Call sites always precede their expansions, so a bounded walk suffices.
            if trace.len() > self.expansions.len() {
                break;
            }
            let Some(expansion) = self.expansion(id) else {
                break;
            };
            trace.push(expansion);
            current = expansion.call_site.expansion;
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_resolve_by_id() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.ci");
        let b = map.add_file("b.ci");
        assert_eq!(map.file_name(a), "a.ci");
        assert_eq!(map.file_name(b), "b.ci");
        assert_eq!(map.file_name(SourceId(9)), "<unknown>");
    }

    #[test]
    fn nested_expansions_trace_innermost_first() {
        let mut map = SourceMap::new();
        let file = map.add_file("m.ci");
        let outer = map.add_expansion("OUTER", Span::in_source(file, 10, 5, 5));
        let inner = map.add_expansion(
            "INNER",
            Span::in_source(file, 2, 3, 5).with_expansion(outer),
        );

        let span = Span::in_source(file, 1, 20, 1).with_expansion(inner);
        let names: Vec<_> = map
            .expansion_trace(span)
            .iter()
            .map(|e| e.macro_name.as_str())
            .collect();
        assert_eq!(names, vec!["INNER", "OUTER"]);
    }

    #[test]
    fn plain_span_has_empty_trace() {
        let map = SourceMap::new();
        assert!(map.expansion_trace(Span::new(1, 1, 1)).is_empty());
    }
}
