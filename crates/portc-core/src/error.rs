//! Error types for every compilation phase.
//!
//! ```text
//! CompileError
//! ├── ParseError      - lexing, preprocessing, macro expansion and syntax
//! ├── ResolveFailure  - ResolveError plus the method being resolved
//! └── ResourceError   - binary resources missing from the search path
//! ```
//!
//! Each error carries the [`Span`] it refers to; [`CompileError::to_diagnostic`]
//! turns any of them into a renderable [`Diagnostic`].

use std::fmt;

use thiserror::Error;

use crate::{Diagnostic, Span};

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of input.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// A type was expected.
    ExpectedType,
    /// A statement was expected.
    ExpectedStatement,
    /// A declaration was expected.
    ExpectedDeclaration,
    /// A class member was expected.
    ExpectedClassMember,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// Invalid modifier for this context.
    InvalidModifier,
    /// Conflicting modifiers were specified.
    ConflictingModifiers,
    /// A literal value could not be parsed.
    InvalidLiteral,
    /// Invalid escape sequence in a string or character literal.
    InvalidEscapeSequence,
    /// A character that starts no token.
    UnexpectedChar,
    /// A string literal was not terminated on its line.
    UnterminatedString,
    /// A block comment was not terminated.
    UnterminatedComment,
    /// Malformed `#if`/`#elif`/`#else`/`#endif` directive.
    InvalidDirective,
    /// Conditional blocks are not balanced.
    UnbalancedConditional,
    /// A macro was invoked while it was already being expanded.
    RecursiveMacro,
    /// A macro was invoked with the wrong number of arguments.
    MacroArguments,
    /// A macro name was defined twice.
    DuplicateMacro,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::ExpectedClassMember => "expected class member",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidModifier => "invalid modifier",
            ParseErrorKind::ConflictingModifiers => "conflicting modifiers",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::InvalidEscapeSequence => "invalid escape sequence",
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::UnterminatedComment => "unterminated comment",
            ParseErrorKind::InvalidDirective => "invalid directive",
            ParseErrorKind::UnbalancedConditional => "unbalanced conditional",
            ParseErrorKind::RecursiveMacro => "recursive macro",
            ParseErrorKind::MacroArguments => "macro argument mismatch",
            ParseErrorKind::DuplicateMacro => "duplicate macro",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
    /// The method whose body was being parsed, if any.
    pub method: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
            method: None,
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected type, found {found}"),
        )
    }

    /// Attach the name of the method being parsed.
    pub fn in_method(mut self, name: impl Into<String>) -> Self {
        if self.method.is_none() {
            self.method = Some(name.into());
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message.clone(), self.span).with_method(self.method.clone())
    }
}

// ============================================================================
// Resolve Errors
// ============================================================================

/// Discriminant of a [`ResolveError`], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveErrorKind {
    DuplicateSymbol,
    UnknownBaseClass,
    CyclicInheritance,
    UnknownSymbol,
    TypeMismatch,
    AmbiguousCall,
    NoApplicableOverload,
    NotConstant,
    MissingReturn,
    UseBeforeAssignment,
    Inaccessible,
    InvalidOverride,
    AbstractInstantiation,
    InvalidJump,
    CaseFallThrough,
    ConstantOverflow,
}

/// Semantic errors found while building the program model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("{name} already defined")]
    DuplicateSymbol { name: String, span: Span },

    #[error("base class {name} not found")]
    UnknownBaseClass { name: String, span: Span },

    #[error("circular inheritance for class {name}")]
    CyclicInheritance { name: String, span: Span },

    #[error("{name} not found")]
    UnknownSymbol { name: String, span: Span },

    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    #[error("ambiguous call to {name}: could be {}", candidates.join(" or "))]
    AmbiguousCall {
        name: String,
        candidates: Vec<String>,
        span: Span,
    },

    #[error("no overload of {name} accepts ({args})")]
    NoApplicableOverload {
        name: String,
        args: String,
        span: Span,
    },

    #[error("{message}")]
    NotConstant { message: String, span: Span },

    #[error("method {method} must return a value")]
    MissingReturn { method: String, span: Span },

    #[error("variable {name} used before assignment")]
    UseBeforeAssignment { name: String, span: Span },

    #[error("{name} is inaccessible here")]
    Inaccessible { name: String, span: Span },

    #[error("{message}")]
    InvalidOverride { message: String, span: Span },

    #[error("cannot instantiate abstract class {name}")]
    AbstractInstantiation { name: String, span: Span },

    #[error("{message}")]
    InvalidJump { message: String, span: Span },

    #[error("case section falls through to the next one")]
    CaseFallThrough { span: Span },

    #[error("{message}")]
    ConstantOverflow { message: String, span: Span },
}

impl ResolveError {
    pub fn type_mismatch(span: Span, message: impl Into<String>) -> Self {
        ResolveError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_symbol(span: Span, name: impl Into<String>) -> Self {
        ResolveError::UnknownSymbol {
            name: name.into(),
            span,
        }
    }

    pub fn duplicate(span: Span, name: impl Into<String>) -> Self {
        ResolveError::DuplicateSymbol {
            name: name.into(),
            span,
        }
    }

    pub fn not_constant(span: Span, message: impl Into<String>) -> Self {
        ResolveError::NotConstant {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ResolveError::DuplicateSymbol { span, .. }
            | ResolveError::UnknownBaseClass { span, .. }
            | ResolveError::CyclicInheritance { span, .. }
            | ResolveError::UnknownSymbol { span, .. }
            | ResolveError::TypeMismatch { span, .. }
            | ResolveError::AmbiguousCall { span, .. }
            | ResolveError::NoApplicableOverload { span, .. }
            | ResolveError::NotConstant { span, .. }
            | ResolveError::MissingReturn { span, .. }
            | ResolveError::UseBeforeAssignment { span, .. }
            | ResolveError::Inaccessible { span, .. }
            | ResolveError::InvalidOverride { span, .. }
            | ResolveError::AbstractInstantiation { span, .. }
            | ResolveError::InvalidJump { span, .. }
            | ResolveError::CaseFallThrough { span }
            | ResolveError::ConstantOverflow { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            ResolveError::DuplicateSymbol { .. } => ResolveErrorKind::DuplicateSymbol,
            ResolveError::UnknownBaseClass { .. } => ResolveErrorKind::UnknownBaseClass,
            ResolveError::CyclicInheritance { .. } => ResolveErrorKind::CyclicInheritance,
            ResolveError::UnknownSymbol { .. } => ResolveErrorKind::UnknownSymbol,
            ResolveError::TypeMismatch { .. } => ResolveErrorKind::TypeMismatch,
            ResolveError::AmbiguousCall { .. } => ResolveErrorKind::AmbiguousCall,
            ResolveError::NoApplicableOverload { .. } => ResolveErrorKind::NoApplicableOverload,
            ResolveError::NotConstant { .. } => ResolveErrorKind::NotConstant,
            ResolveError::MissingReturn { .. } => ResolveErrorKind::MissingReturn,
            ResolveError::UseBeforeAssignment { .. } => ResolveErrorKind::UseBeforeAssignment,
            ResolveError::Inaccessible { .. } => ResolveErrorKind::Inaccessible,
            ResolveError::InvalidOverride { .. } => ResolveErrorKind::InvalidOverride,
            ResolveError::AbstractInstantiation { .. } => ResolveErrorKind::AbstractInstantiation,
            ResolveError::InvalidJump { .. } => ResolveErrorKind::InvalidJump,
            ResolveError::CaseFallThrough { .. } => ResolveErrorKind::CaseFallThrough,
            ResolveError::ConstantOverflow { .. } => ResolveErrorKind::ConstantOverflow,
        }
    }
}

/// A [`ResolveError`] together with the method whose body was being resolved.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct ResolveFailure {
    #[source]
    pub error: ResolveError,
    pub method: Option<String>,
}

impl ResolveFailure {
    pub fn kind(&self) -> ResolveErrorKind {
        self.error.kind()
    }

    pub fn span(&self) -> Span {
        self.error.span()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.error.to_string(), self.error.span()).with_method(self.method.clone())
    }
}

impl From<ResolveError> for ResolveFailure {
    fn from(error: ResolveError) -> Self {
        Self {
            error,
            method: None,
        }
    }
}

// ============================================================================
// Resource Errors
// ============================================================================

/// Failures loading `BinaryResource` contents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("resource {path} not found")]
    NotFound { path: String, span: Span },

    #[error("cannot read resource {path}: {message}")]
    Unreadable {
        path: String,
        message: String,
        span: Span,
    },
}

impl ResourceError {
    pub fn span(&self) -> Span {
        match self {
            ResourceError::NotFound { span, .. } | ResourceError::Unreadable { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string(), self.span())
    }
}

/// A `-D` symbol that may not be defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("symbol {0} is reserved and cannot be defined")]
pub struct ReservedSymbol(pub String);

// ============================================================================
// Top-level
// ============================================================================

/// Any error that aborts compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveFailure),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Parse(e) => e.span,
            CompileError::Resolve(e) => e.span(),
            CompileError::Resource(e) => e.span(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(e) => e.to_diagnostic(),
            CompileError::Resolve(e) => e.to_diagnostic(),
            CompileError::Resource(e) => e.to_diagnostic(),
        }
    }
}

impl From<ResolveError> for CompileError {
    fn from(error: ResolveError) -> Self {
        CompileError::Resolve(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_kind_and_span() {
        let span = Span::new(4, 2, 3);
        let err = ResolveError::AmbiguousCall {
            name: "f".into(),
            candidates: vec!["f(int)".into(), "f(long)".into()],
            span,
        };
        assert_eq!(err.kind(), ResolveErrorKind::AmbiguousCall);
        assert_eq!(err.span(), span);
        assert_eq!(err.to_string(), "ambiguous call to f: could be f(int) or f(long)");
    }

    #[test]
    fn failure_carries_method_into_diagnostic() {
        let failure = ResolveFailure {
            error: ResolveError::unknown_symbol(Span::new(2, 1, 1), "x"),
            method: Some("Main".into()),
        };
        let diagnostic = failure.to_diagnostic();
        assert_eq!(diagnostic.method.as_deref(), Some("Main"));
        assert_eq!(diagnostic.message, "x not found");
    }

    #[test]
    fn parse_error_keeps_innermost_method() {
        let err = ParseError::unexpected_eof(Span::new(1, 1, 0))
            .in_method("Inner")
            .in_method("Outer");
        assert_eq!(err.method.as_deref(), Some("Inner"));
    }

    #[test]
    fn compile_error_wraps_phases() {
        let err: CompileError = ResourceError::NotFound {
            path: "logo.bin".into(),
            span: Span::new(9, 4, 14),
        }
        .into();
        assert_eq!(err.to_string(), "resource logo.bin not found");
        assert_eq!(err.span().line, 9);
    }
}
