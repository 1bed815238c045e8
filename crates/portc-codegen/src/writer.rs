//! Line-oriented output with indentation.

pub(crate) const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub(crate) struct SourceWriter {
    out: String,
    level: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Write `line` at the current indentation; empty lines stay empty.
    pub fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(INDENT);
            }
            self.out.push_str(line);
        }
        self.out.push('\n');
    }

    /// Separate two sections with one empty line, never more.
    pub fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_lines() {
        let mut w = SourceWriter::new();
        w.writeln("a {");
        w.indent();
        w.writeln("b;");
        w.writeln("");
        w.dedent();
        w.writeln("}");
        assert_eq!(w.finish(), "a {\n    b;\n\n}\n");
    }

    #[test]
    fn blank_lines_do_not_stack() {
        let mut w = SourceWriter::new();
        w.blank_line();
        w.writeln("x");
        w.blank_line();
        w.blank_line();
        w.writeln("y");
        assert_eq!(w.finish(), "x\n\ny\n");
    }
}
