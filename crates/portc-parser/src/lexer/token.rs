//! Token definitions.

use std::fmt;

use portc_core::Span;

/// A token, with its lexeme copied into the parse arena.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// Human-readable form for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Error => "invalid token".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntLiteral,
    /// `1.5f`
    FloatLiteral,
    /// `1.5`, `1e10`
    DoubleLiteral,
    StringLiteral,
    /// `'a'`
    CharLiteral,
    Identifier,

    // Type keywords
    Void,
    Bool,
    Byte,
    Int,
    Long,
    Float,
    Double,
    String,

    // Value keywords
    True,
    False,
    Null,
    This,
    Base,
    New,

    // Control flow
    If,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Throw,

    // Declarations
    Class,
    Enum,
    Delegate,
    Macro,
    Const,
    Public,
    Private,
    Protected,
    Static,
    Virtual,
    Override,
    Abstract,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LessLess,
    GreaterGreater,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    Bang,
    Tilde,

    Eof,
    /// Produced when lexing or macro expansion fails; the error is held by the stream.
    Error,
}

impl TokenKind {
    /// Whether this keyword names a primitive type.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Bool
                | TokenKind::Byte
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::String
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                | TokenKind::Virtual
                | TokenKind::Override
                | TokenKind::Abstract
        )
    }
}

/// Keyword lookup for an identifier-shaped lexeme.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "void" => TokenKind::Void,
        "bool" => TokenKind::Bool,
        "byte" => TokenKind::Byte,
        "int" => TokenKind::Int,
        "long" => TokenKind::Long,
        "float" => TokenKind::Float,
        "double" => TokenKind::Double,
        "string" => TokenKind::String,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "this" => TokenKind::This,
        "base" => TokenKind::Base,
        "new" => TokenKind::New,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "throw" => TokenKind::Throw,
        "class" => TokenKind::Class,
        "enum" => TokenKind::Enum,
        "delegate" => TokenKind::Delegate,
        "macro" => TokenKind::Macro,
        "const" => TokenKind::Const,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "static" => TokenKind::Static,
        "virtual" => TokenKind::Virtual,
        "override" => TokenKind::Override,
        "abstract" => TokenKind::Abstract,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(lookup_keyword("delegate"), Some(TokenKind::Delegate));
        assert_eq!(lookup_keyword("macro"), Some(TokenKind::Macro));
        assert_eq!(lookup_keyword("Macro"), None);
        assert_eq!(lookup_keyword("BinaryResource"), None);
    }

    #[test]
    fn primitive_type_keywords() {
        assert!(TokenKind::Byte.is_primitive_type());
        assert!(TokenKind::String.is_primitive_type());
        assert!(!TokenKind::Class.is_primitive_type());
    }
}
