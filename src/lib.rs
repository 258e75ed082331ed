//! # dowhilec - front end for a DO/WHILE teaching language
//!
//! Lexes, parses and checks programs of the form
//!
//! ```text
//! int x = 5;
//! DO
//!     x = x + 1;
//! ENDDO WHILE (int y == 10) ENDWHILE
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Input → Lexer → tokens ─────────────────────────→ display buckets
//!           └───→ Parser → AST ─(ReductionSink)─→ SemanticAnalyzer → diagnostics
//! ```
//!
//! ## Example
//!
//! ```rust
//! let result = dowhilec::parse("int x = 5; DO y = 1; ENDDO WHILE (int z == 0) ENDWHILE");
//! assert_eq!(result.diagnostics, vec!["Error: variable 'y' is not declared"]);
//! ```

#![warn(clippy::all)]

pub mod frontend;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::{
        check, lex, parse, parse_with_context, tokenize, Diagnostic, Lexer, ParseContext,
        ParseResult, Parser, ParserConfig, ReductionSink, SemanticAnalyzer, Token, TokenKind,
        TokenValue,
    };
    pub use crate::frontend::ast::*;
    pub use crate::report::{classify, compile, compile_with, Bucket, CompileConfig, CompileReport, TokenCounts};
    pub use crate::utils::errors::*;
}

pub use frontend::{check, lex, parse, parse_with_context, tokenize, ParseResult};
pub use report::{compile, compile_with, CompileReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
