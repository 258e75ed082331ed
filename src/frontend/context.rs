//! Per-parse mutable state: the symbol table and the diagnostics collector.
//!
//! A [`ParseContext`] is created (or reset) by the caller for every parse
//! and handed to the parser explicitly, so two parses never share state
//! unless the caller asks them to.

use crate::utils::errors::{FrontendError, ParseError, SemanticError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// The set of declared variable names. One flat scope per program.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    names: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`. Returns `false` if it was already declared; the caller
    /// decides whether that is an error.
    pub fn declare(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Declared names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn reset(&mut self) {
        self.names.clear();
    }
}

/// One entry of the diagnostics list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// Unexpected token or end of input
    Syntax(ParseError),
    /// Redeclared or undeclared variable
    Semantic(SemanticError),
    /// Failure caught at the request boundary
    Internal(String),
}

impl Diagnostic {
    /// The human-readable message shown to users.
    pub fn message(&self) -> &str {
        match self {
            Diagnostic::Syntax(e) => &e.message,
            Diagnostic::Semantic(e) => &e.message,
            Diagnostic::Internal(message) => message,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Diagnostic::Syntax(_))
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Diagnostic::Semantic(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Diagnostic::Syntax(error)
    }
}

impl From<SemanticError> for Diagnostic {
    fn from(error: SemanticError) -> Self {
        Diagnostic::Semantic(error)
    }
}

impl From<Diagnostic> for FrontendError {
    fn from(diagnostic: Diagnostic) -> Self {
        match diagnostic {
            Diagnostic::Syntax(e) => FrontendError::Parse(e),
            Diagnostic::Semantic(e) => FrontendError::Semantic(e),
            Diagnostic::Internal(message) => FrontendError::Internal(message),
        }
    }
}

/// Append-only, ordered collection of syntax and semantic errors.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.items.push(diagnostic.into());
    }

    /// Every recorded entry, in the order it was recorded.
    pub fn all_errors(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|d| d.message().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }
}

/// Symbol table and diagnostics for one parse request.
#[derive(Debug, Default, Clone)]
pub struct ParseContext {
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both containers before reusing the context for a new request.
    pub fn reset(&mut self) {
        self.symbols.reset();
        self.diagnostics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::location::Span;

    #[test]
    fn test_declare_reports_repeats() {
        let mut symbols = SymbolTable::new();
        assert!(symbols.declare("x"));
        assert!(!symbols.declare("x"));
        assert!(symbols.contains("x"));
        assert!(!symbols.contains("y"));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let mut symbols = SymbolTable::new();
        for name in ["zeta", "alpha", "mid"] {
            symbols.declare(name);
        }
        assert_eq!(symbols.names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_diagnostics_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record_error(SemanticError::undeclared("b", Span::dummy()));
        diagnostics.record_error(ParseError::end_of_input(Span::dummy()));
        diagnostics.record_error(SemanticError::redeclared("a", Span::dummy()));
        assert_eq!(diagnostics.messages(), vec![
            "Error: variable 'b' is not declared".to_string(),
            "Syntax error at end of input".to_string(),
            "Error: variable 'a' redeclared".to_string(),
        ]);
        assert!(diagnostics.all_errors()[1].is_syntax());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ctx = ParseContext::new();
        ctx.symbols.declare("x");
        ctx.diagnostics.record_error(SemanticError::redeclared("x", Span::dummy()));
        ctx.reset();
        assert!(ctx.symbols.is_empty());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostic_into_frontend_error() {
        let err: FrontendError = Diagnostic::from(SemanticError::undeclared("q", Span::dummy())).into();
        assert!(matches!(err, FrontendError::Semantic(_)));
    }
}
