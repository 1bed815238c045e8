//! Rendering of errors and warnings for the command line.

use std::fmt::Write;

use crate::{SourceMap, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// A located message, ready to be rendered against a [`SourceMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub method: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            method: None,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            method: None,
        }
    }

    pub fn with_method(mut self, method: Option<String>) -> Self {
        self.method = method;
        self
    }

    /// Render as `file(line): ERROR: message`, followed by one
    /// `   in macro NAME at file(line)` line per enclosing macro expansion
    /// and an `   in method NAME` line when a method was being processed.
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "{}({}): {}: {}",
            sources.file_name(self.span.source),
            self.span.line,
            self.severity.label(),
            self.message
        );
        for expansion in sources.expansion_trace(self.span) {
            let site = expansion.call_site;
            let _ = write!(
                out,
                "\n   in macro {} at {}({})",
                expansion.macro_name,
                sources.file_name(site.source),
                site.line
            );
        }
        if let Some(method) = &self.method {
            let _ = write!(out, "\n   in method {method}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_error() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("shapes.ci");
        let diagnostic = Diagnostic::error("Foo not found", Span::in_source(file, 12, 5, 3));
        assert_eq!(diagnostic.render(&sources), "shapes.ci(12): ERROR: Foo not found");
    }

    #[test]
    fn renders_macro_trace_and_method() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("m.ci");
        let expansion = sources.add_expansion("SQUARE", Span::in_source(file, 30, 9, 6));
        let span = Span::in_source(file, 2, 20, 1).with_expansion(expansion);
        let diagnostic = Diagnostic::error("type mismatch", span).with_method(Some("Area".into()));
        assert_eq!(
            diagnostic.render(&sources),
            "m.ci(2): ERROR: type mismatch\n   in macro SQUARE at m.ci(30)\n   in method Area"
        );
    }

    #[test]
    fn renders_warning_label() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("w.ci");
        let diagnostic = Diagnostic::warning("unreachable code", Span::in_source(file, 3, 1, 1));
        assert_eq!(diagnostic.render(&sources), "w.ci(3): WARNING: unreachable code");
    }
}
