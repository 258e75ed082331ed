//! Error types for the front end.
//!
//! Errors are organized by the phase that produces them. None of them
//! aborts compilation on its own: lexical errors are logged and skipped,
//! syntax and semantic errors are collected into the diagnostics list.

use crate::utils::location::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Top-level error type for the front end.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// Error during lexing
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error during semantic analysis
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    /// Internal failure caught at the request boundary
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub struct LexerError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LexerErrorKind {
    /// `3.` or `.5`: the language only has integers
    FloatLiteral,
    /// Integer literal that does not fit in 64 bits
    IntegerOverflow,
    /// Character outside the language alphabet
    IllegalCharacter,
}

/// Error during parsing.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// What was found
    pub found: Option<String>,
}

impl ParseError {
    /// Unexpected token with the given value.
    pub fn unexpected(found: &str, span: Span) -> Self {
        Self {
            message: format!("Syntax error at '{}'", found),
            span,
            kind: ParseErrorKind::UnexpectedToken,
            found: Some(found.to_string()),
        }
    }

    /// Input ended while the grammar still expected tokens.
    pub fn end_of_input(span: Span) -> Self {
        Self {
            message: "Syntax error at end of input".to_string(),
            span,
            kind: ParseErrorKind::UnexpectedEof,
            found: None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken,
    /// Unexpected end of input
    UnexpectedEof,
}

/// Error during semantic analysis.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub struct SemanticError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of semantic error
    pub kind: SemanticErrorKind,
    /// The variable involved
    pub name: String,
}

impl SemanticError {
    /// A name declared a second time, by a declaration or the loop condition.
    pub fn redeclared(name: &str, span: Span) -> Self {
        Self {
            message: format!("Error: variable '{}' redeclared", name),
            span,
            kind: SemanticErrorKind::Redeclared,
            name: name.to_string(),
        }
    }

    /// A name used before any declaration introduced it.
    pub fn undeclared(name: &str, span: Span) -> Self {
        Self {
            message: format!("Error: variable '{}' is not declared", name),
            span,
            kind: SemanticErrorKind::Undeclared,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticErrorKind {
    /// Declared twice
    Redeclared,
    /// Used without a declaration
    Undeclared,
}

/// Result type using FrontendError.
pub type FrontendResult<T> = Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::location::SourceLocation;

    #[test]
    fn test_error_display() {
        let span = Span::new(SourceLocation::new(1, 5, 4), SourceLocation::new(1, 6, 5));
        let err = ParseError::unexpected(";", span);
        assert_eq!(err.message, "Syntax error at ';'");
        assert_eq!(format!("{}", err), "Syntax error at ';' at 1:5-6");
    }

    #[test]
    fn test_semantic_messages() {
        let redeclared = SemanticError::redeclared("x", Span::dummy());
        assert_eq!(redeclared.message, "Error: variable 'x' redeclared");
        assert_eq!(redeclared.kind, SemanticErrorKind::Redeclared);

        let undeclared = SemanticError::undeclared("y", Span::dummy());
        assert_eq!(undeclared.message, "Error: variable 'y' is not declared");
    }

    #[test]
    fn test_frontend_error_wraps_phases() {
        let err: FrontendError = ParseError::end_of_input(Span::dummy()).into();
        assert!(err.to_string().starts_with("Parse error: Syntax error at end of input"));
    }
}
