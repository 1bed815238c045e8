//! Conditional compilation.
//!
//! Lines starting with `#if`, `#elif`, `#else` or `#endif` select which parts
//! of a file reach the lexer. Directive lines and inactive lines are replaced
//! by empty lines so every surviving token keeps its original line number.
//!
//! Conditions use symbols from the [`DefineSet`], combined with `!`, `&&`,
//! `||`, `==`, `!=` and parentheses.

use portc_core::{DefineSet, ParseError, ParseErrorKind, SourceId, Span};

/// One open `#if` group.
struct Conditional {
    /// Whether lines in the current branch are emitted.
    active: bool,
    /// Whether some branch of the group has already been taken.
    taken: bool,
    /// Whether the enclosing group is emitting lines.
    parent_active: bool,
    seen_else: bool,
    span: Span,
}

/// Apply conditional compilation to `text`.
pub fn preprocess(text: &str, source: SourceId, defines: &DefineSet) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<Conditional> = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let line_no = index as u32 + 1;
        let trimmed = line.trim_start();
        let active = stack.last().is_none_or(|c| c.active);

        let Some(directive) = trimmed.strip_prefix('#') else {
            if active {
                out.push_str(line);
            }
            continue;
        };

        let col = (line.len() - trimmed.len()) as u32 + 1;
        let span = Span::in_source(source, line_no, col, trimmed.trim_end().len() as u32);
        let directive = directive.trim();
        let (name, rest) = directive
            .split_once(|c: char| c.is_whitespace() || c == '(' || c == '!')
            .map(|(name, _)| (name, directive[name.len()..].trim()))
            .unwrap_or((directive, ""));

        match name {
            "if" => {
                let value = active && evaluate(rest, span, defines)?;
                stack.push(Conditional {
                    active: value,
                    taken: value,
                    parent_active: active,
                    seen_else: false,
                    span,
                });
            }
            "elif" => {
                let Some(top) = stack.last_mut() else {
                    return Err(unbalanced(span, "#elif without #if"));
                };
                if top.seen_else {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidDirective,
                        span,
                        "#elif after #else",
                    ));
                }
                let value = evaluate(rest, span, defines)?;
                top.active = top.parent_active && !top.taken && value;
                top.taken |= top.active;
            }
            "else" => {
                let Some(top) = stack.last_mut() else {
                    return Err(unbalanced(span, "#else without #if"));
                };
                if top.seen_else {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidDirective,
                        span,
                        "duplicate #else",
                    ));
                }
                if !is_blank(rest) {
                    return Err(extra_tokens(span, "#else"));
                }
                top.seen_else = true;
                top.active = top.parent_active && !top.taken;
                top.taken = true;
            }
            "endif" => {
                if !is_blank(rest) {
                    return Err(extra_tokens(span, "#endif"));
                }
                if stack.pop().is_none() {
                    return Err(unbalanced(span, "#endif without #if"));
                }
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDirective,
                    span,
                    format!("unknown directive #{name}"),
                ));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(unbalanced(open.span, "#if without #endif"));
    }
    Ok(out)
}

fn is_blank(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with("//")
}

fn unbalanced(span: Span, message: &str) -> ParseError {
    ParseError::new(ParseErrorKind::UnbalancedConditional, span, message)
}

fn extra_tokens(span: Span, directive: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::InvalidDirective,
        span,
        format!("unexpected text after {directive}"),
    )
}

fn evaluate(expr: &str, span: Span, defines: &DefineSet) -> Result<bool, ParseError> {
    let tokens = tokenize(expr, span)?;
    if tokens.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidDirective,
            span,
            "expected condition",
        ));
    }
    let mut parser = ConditionParser {
        tokens: &tokens,
        pos: 0,
        span,
        defines,
    };
    let value = parser.or()?;
    if parser.pos != tokens.len() {
        return Err(parser.invalid("unexpected text in condition"));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum CondToken<'a> {
    Symbol(&'a str),
    Not,
    And,
    Or,
    Eq,
    Ne,
    Open,
    Close,
}

fn tokenize(expr: &str, span: Span) -> Result<Vec<CondToken<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        let two = expr.get(i..i + 2);
        match c {
            ' ' | '\t' | '\r' => i += 1,
            '(' => {
                tokens.push(CondToken::Open);
                i += 1;
            }
            ')' => {
                tokens.push(CondToken::Close);
                i += 1;
            }
            '!' if two == Some("!=") => {
                tokens.push(CondToken::Ne);
                i += 2;
            }
            '!' => {
                tokens.push(CondToken::Not);
                i += 1;
            }
            '=' if two == Some("==") => {
                tokens.push(CondToken::Eq);
                i += 2;
            }
            '&' if two == Some("&&") => {
                tokens.push(CondToken::And);
                i += 2;
            }
            '|' if two == Some("||") => {
                tokens.push(CondToken::Or);
                i += 2;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(CondToken::Symbol(&expr[start..i]));
            }
            // Trailing line comments end the condition.
            '/' if two == Some("//") => break,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidDirective,
                    span,
                    format!("unexpected '{c}' in condition"),
                ));
            }
        }
    }
    Ok(tokens)
}

struct ConditionParser<'t, 'a> {
    tokens: &'t [CondToken<'a>],
    pos: usize,
    span: Span,
    defines: &'t DefineSet,
}

impl ConditionParser<'_, '_> {
    fn invalid(&self, message: &str) -> ParseError {
        ParseError::new(ParseErrorKind::InvalidDirective, self.span, message)
    }

    fn eat(&mut self, token: &CondToken<'_>) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<bool, ParseError> {
        let mut value = self.and()?;
        while self.eat(&CondToken::Or) {
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, ParseError> {
        let mut value = self.equality()?;
        while self.eat(&CondToken::And) {
            let rhs = self.equality()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn equality(&mut self) -> Result<bool, ParseError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&CondToken::Eq) {
                value = value == self.unary()?;
            } else if self.eat(&CondToken::Ne) {
                value = value != self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<bool, ParseError> {
        if self.eat(&CondToken::Not) {
            return Ok(!self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool, ParseError> {
        match self.tokens.get(self.pos) {
            Some(CondToken::Open) => {
                self.pos += 1;
                let value = self.or()?;
                if !self.eat(&CondToken::Close) {
                    return Err(self.invalid("expected ')' in condition"));
                }
                Ok(value)
            }
            Some(CondToken::Symbol(name)) => {
                self.pos += 1;
                Ok(self.defines.contains(name))
            }
            _ => Err(self.invalid("expected symbol in condition")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, symbols: &[&str]) -> Result<String, ParseError> {
        let defines = DefineSet::with_symbols(symbols.iter().copied()).unwrap();
        preprocess(text, SourceId(0), &defines)
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(run("a\nb", &[]).unwrap(), "a\nb");
    }

    #[test]
    fn inactive_branch_is_blanked_preserving_lines() {
        let text = "#if DEBUG\nlog();\n#else\nrun();\n#endif\nend();";
        assert_eq!(run(text, &[]).unwrap(), "\n\n\nrun();\n\nend();");
        assert_eq!(run(text, &["DEBUG"]).unwrap(), "\nlog();\n\n\n\nend();");
    }

    #[test]
    fn elif_takes_first_true_branch() {
        let text = "#if A\na\n#elif B\nb\n#elif true\nc\n#endif";
        assert_eq!(run(text, &["B"]).unwrap(), "\n\n\nb\n\n\n");
        assert_eq!(run(text, &[]).unwrap(), "\n\n\n\n\nc\n");
    }

    #[test]
    fn nested_groups_respect_parent() {
        let text = "#if A\n#if true\nx\n#endif\n#endif";
        assert_eq!(run(text, &[]).unwrap(), "\n\n\n\n");
    }

    #[test]
    fn condition_operators() {
        let defines = DefineSet::with_symbols(["A", "B"]).unwrap();
        let span = Span::default();
        assert!(evaluate("A && B", span, &defines).unwrap());
        assert!(evaluate("!(A && C) || false", span, &defines).unwrap());
        assert!(evaluate("A == B", span, &defines).unwrap());
        assert!(evaluate("A != C", span, &defines).unwrap());
        assert!(!evaluate("false", span, &defines).unwrap());
        assert!(evaluate("true", span, &defines).unwrap());
    }

    #[test]
    fn missing_endif_is_unbalanced() {
        let err = run("#if A\nx", &[]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedConditional);
        assert_eq!(err.span.line, 1);
    }

    #[test]
    fn stray_endif_is_unbalanced() {
        let err = run("x\n#endif", &[]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedConditional);
        assert_eq!(err.span.line, 2);
    }

    #[test]
    fn elif_after_else_is_invalid() {
        let err = run("#if A\n#else\n#elif B\n#endif", &[]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDirective);
    }

    #[test]
    fn malformed_condition_is_invalid() {
        let err = run("#if A &&\n#endif", &[]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDirective);
    }
}
