//! Parsing of a whole compilation: every input file shares one arena, one
//! macro table and one source map.

use bumpalo::Bump;
use portc_core::{DefineSet, ParseError, SourceMap};

use crate::ast::Script;
use crate::lexer::Lexer;
use crate::macros::{MacroTable, TokenStream};
use crate::parser::Parser;
use crate::preprocess::preprocess;

/// State shared by the files of one compilation.
///
/// Macros defined in an earlier file are visible in later ones, so files
/// must be parsed in command-line order.
pub struct ParseSession<'ast> {
    arena: &'ast Bump,
    defines: DefineSet,
    macros: MacroTable<'ast>,
    sources: SourceMap,
}

impl<'ast> ParseSession<'ast> {
    pub fn new(arena: &'ast Bump, defines: DefineSet) -> Self {
        Self {
            arena,
            defines,
            macros: MacroTable::new(),
            sources: SourceMap::new(),
        }
    }

    /// Preprocess and parse one file.
    #[tracing::instrument(level = "debug", skip_all, fields(file = name))]
    pub fn parse_file(&mut self, name: &str, text: &str) -> Result<Script<'ast>, ParseError> {
        let source = self.sources.add_file(name);
        let expanded = preprocess(text, source, &self.defines)?;
        let lexer = Lexer::new(&expanded, source, self.arena);
        let tokens = TokenStream::new(lexer, &mut self.macros, &mut self.sources);
        let script = Parser::new(self.arena, tokens, source).parse_script()?;
        tracing::debug!(items = script.items().len(), "parsed");
        Ok(script)
    }

    pub fn defines(&self) -> &DefineSet {
        &self.defines
    }

    pub fn macros(&self) -> &MacroTable<'ast> {
        &self.macros
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Give up the session, keeping the source map for diagnostics.
    pub fn into_sources(self) -> SourceMap {
        self.sources
    }
}
