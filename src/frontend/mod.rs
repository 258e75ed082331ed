//! Frontend: Lexer, Parser, AST and declaration checks.
//!
//! ## Language Overview
//!
//! A program declares integers, then runs one post-test loop:
//!
//! ```text
//! int x = 5;
//! int step = 2;
//! DO
//!     x = x + step * 3;
//! ENDDO WHILE (int done == 1) ENDWHILE
//! ```
//!
//! Expressions use `+` and `*`, each at most once per level. The loop
//! condition declares its variable rather than reading it.

pub mod token;
pub mod lexer;
pub mod ast;
pub mod context;
pub mod parser;
pub mod semantic;

// Re-exports
pub use ast::*;
pub use context::{Diagnostic, Diagnostics, ParseContext, SymbolTable};
pub use lexer::Lexer;
pub use parser::{Parser, ParserConfig, ReductionSink};
pub use semantic::SemanticAnalyzer;
pub use token::{Token, TokenKind, TokenValue};
pub use crate::utils::errors::{LexerError, ParseError, SemanticError};

use crate::utils::errors::FrontendResult;
use log::debug;
use serde::Serialize;

/// Outcome of one parse request.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// The tree, when the whole program was recognised
    pub program: Option<Program>,
    /// Syntax and semantic errors, in the order they were found
    pub diagnostics: Vec<String>,
}

impl ParseResult {
    /// A program was built and nothing was reported.
    pub fn is_success(&self) -> bool {
        self.program.is_some() && self.diagnostics.is_empty()
    }
}

/// Tokenize source text. Lexical errors are logged and skipped.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Tokenize source text, also returning the lexical errors.
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexerError>) {
    Lexer::new(source).lex_all()
}

/// Parse and check source code with a fresh context.
pub fn parse(source: &str) -> ParseResult {
    let mut ctx = ParseContext::new();
    parse_with_context(source, &mut ctx, &ParserConfig::default())
}

/// Parse and check source code, recording into `ctx`.
///
/// The context is not reset here; callers that reuse one context across
/// requests call [`ParseContext::reset`] first.
pub fn parse_with_context(source: &str, ctx: &mut ParseContext, config: &ParserConfig) -> ParseResult {
    let mut parser = Parser::with_config(Lexer::new(source), config.clone());
    let program = {
        let mut analyzer = SemanticAnalyzer::new(ctx);
        parser.parse_program(&mut analyzer)
    };
    debug!(
        "parsed {} bytes: {} syntax error(s), {} diagnostic(s) total",
        source.len(),
        parser.errors().len(),
        ctx.diagnostics.len()
    );
    ParseResult {
        program,
        diagnostics: ctx.diagnostics.messages(),
    }
}

/// Parse and check source code, failing on the first diagnostic.
pub fn check(source: &str) -> FrontendResult<Program> {
    let mut ctx = ParseContext::new();
    let result = parse_with_context(source, &mut ctx, &ParserConfig::default());
    if let Some(first) = ctx.diagnostics.all_errors().first() {
        return Err(first.clone().into());
    }
    result
        .program
        .ok_or_else(|| crate::utils::errors::FrontendError::Internal("parser produced no program".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::FrontendError;

    #[test]
    fn test_parse_simple() {
        let result = parse("int x = 5; DO x = x + 1; ENDDO WHILE (int y == 10) ENDWHILE");
        assert!(result.is_success());
    }

    #[test]
    fn test_context_is_not_reset_implicitly() {
        let mut ctx = ParseContext::new();
        let source = "int x = 5; DO x = 1; ENDDO WHILE (int z == 0) ENDWHILE";
        let config = ParserConfig::default();
        assert!(parse_with_context(source, &mut ctx, &config).is_success());

        let again = parse_with_context(source, &mut ctx, &config);
        assert_eq!(again.diagnostics.len(), 2);

        ctx.reset();
        assert!(parse_with_context(source, &mut ctx, &config).is_success());
    }

    #[test]
    fn test_tokenize_skips_lexical_errors() {
        let tokens = tokenize("int x = 3.14;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Assign, TokenKind::Semicolon]);
    }

    #[test]
    fn test_check_returns_first_error() {
        let err = check("int x = 5; DO y = 1; ENDDO WHILE (int z == 0) ENDWHILE").unwrap_err();
        assert!(matches!(err, FrontendError::Semantic(ref e) if e.name == "y"));

        let err = check("int x = 5; DO").unwrap_err();
        assert!(matches!(err, FrontendError::Parse(_)));

        assert!(check("int x = 5; DO x = 1; ENDDO WHILE (int z == 0) ENDWHILE").is_ok());
    }
}
