//! Semantic analysis for the DO/WHILE language.
//!
//! The only checks are declaration checks: a name may be declared once,
//! and every name read or assigned in the loop body must already be
//! declared. Checks run in reduction order, which means the `WHILE`
//! condition (itself a declaration) is processed after the whole body.
//! A body that uses the condition's variable without an earlier `int`
//! declaration is therefore reported as using an undeclared name.

use crate::frontend::ast::*;
use crate::frontend::context::ParseContext;
use crate::frontend::parser::ReductionSink;
use crate::utils::errors::{ParseError, SemanticError};
use crate::utils::location::Span;

/// Run the declaration checks over a finished program, in reduction order.
pub fn analyze(program: &Program, ctx: &mut ParseContext) {
    let mut analyzer = SemanticAnalyzer::new(ctx);
    analyzer.analyze_program(program);
}

/// Semantic analyzer writing into a borrowed [`ParseContext`].
///
/// Used as the parser's [`ReductionSink`], it also records syntax errors so
/// that both kinds of diagnostics end up in one ordered list.
pub struct SemanticAnalyzer<'ctx> {
    ctx: &'ctx mut ParseContext,
}

impl<'ctx> SemanticAnalyzer<'ctx> {
    pub fn new(ctx: &'ctx mut ParseContext) -> Self {
        Self { ctx }
    }

    pub fn analyze_program(&mut self, program: &Program) {
        for decl in &program.declarations {
            self.analyze_declaration(decl);
        }
        for stmt in &program.block {
            self.analyze_statement(stmt);
        }
        self.analyze_condition(&program.condition);
    }

    pub fn analyze_declaration(&mut self, decl: &Declaration) {
        self.declare(&decl.name, decl.span);
    }

    /// Operands first, left to right, then the assigned name.
    pub fn analyze_statement(&mut self, stmt: &Statement) {
        for factor in stmt.expr.leaves() {
            self.analyze_factor(factor);
        }
        self.analyze_target(stmt);
    }

    /// A variable operand must already be declared.
    pub fn analyze_factor(&mut self, factor: &Factor) {
        if let Some(name) = factor.variable_name() {
            self.require(name, factor.span);
        }
    }

    pub fn analyze_target(&mut self, stmt: &Statement) {
        self.require(&stmt.target, stmt.target_span);
    }

    /// The condition declares its variable; it is not a use.
    pub fn analyze_condition(&mut self, cond: &Condition) {
        self.declare(&cond.name, cond.span);
    }

    fn declare(&mut self, name: &str, span: Span) {
        if !self.ctx.symbols.declare(name) {
            self.ctx.diagnostics.record_error(SemanticError::redeclared(name, span));
        }
    }

    fn require(&mut self, name: &str, span: Span) {
        if !self.ctx.symbols.contains(name) {
            self.ctx.diagnostics.record_error(SemanticError::undeclared(name, span));
        }
    }
}

impl ReductionSink for SemanticAnalyzer<'_> {
    fn declaration(&mut self, decl: &Declaration) {
        self.analyze_declaration(decl);
    }

    fn factor(&mut self, factor: &Factor) {
        self.analyze_factor(factor);
    }

    // Operands were checked as they were reduced.
    fn statement(&mut self, stmt: &Statement) {
        self.analyze_target(stmt);
    }

    fn condition(&mut self, cond: &Condition) {
        self.analyze_condition(cond);
    }

    fn syntax_error(&mut self, error: &ParseError) {
        self.ctx.diagnostics.record_error(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Lexer, Parser};
    use crate::utils::errors::SemanticErrorKind;

    fn check(source: &str) -> ParseContext {
        let program = Parser::new(Lexer::new(source))
            .parse_program(&mut ())
            .expect("test program should parse");
        let mut ctx = ParseContext::new();
        analyze(&program, &mut ctx);
        ctx
    }

    fn semantic_kinds(ctx: &ParseContext) -> Vec<SemanticErrorKind> {
        ctx.diagnostics
            .all_errors()
            .iter()
            .filter_map(|d| match d {
                crate::frontend::Diagnostic::Semantic(e) => Some(e.kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_clean_program() {
        let ctx = check("int x = 5; DO x = x + 1; ENDDO WHILE (int y == 10) ENDWHILE");
        assert!(ctx.diagnostics.is_empty());
        assert_eq!(ctx.symbols.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_redeclaration() {
        let ctx = check("int x = 5; int x = 6; DO x = 1; ENDDO WHILE (int z == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec!["Error: variable 'x' redeclared".to_string()]);
    }

    #[test]
    fn test_each_repeat_is_reported() {
        let ctx = check("int x = 1; int x = 2; int x = 3; DO x = 1; ENDDO WHILE (int x == 0) ENDWHILE");
        assert_eq!(semantic_kinds(&ctx), vec![SemanticErrorKind::Redeclared; 3]);
    }

    #[test]
    fn test_undeclared_target() {
        let ctx = check("int x = 5; DO y = 1; ENDDO WHILE (int z == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec!["Error: variable 'y' is not declared".to_string()]);
    }

    #[test]
    fn test_operands_reported_before_target() {
        let ctx = check("int x = 5; DO a = b * x + c; ENDDO WHILE (int z == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec![
            "Error: variable 'b' is not declared".to_string(),
            "Error: variable 'c' is not declared".to_string(),
            "Error: variable 'a' is not declared".to_string(),
        ]);
    }

    #[test]
    fn test_every_use_is_reported() {
        let ctx = check("int x = 5; DO x = q * q; x = q; ENDDO WHILE (int z == 0) ENDWHILE");
        assert_eq!(semantic_kinds(&ctx), vec![SemanticErrorKind::Undeclared; 3]);
    }

    #[test]
    fn test_condition_declares_after_body() {
        let ctx = check("int x = 5; DO x = n; ENDDO WHILE (int n == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec!["Error: variable 'n' is not declared".to_string()]);
        assert!(ctx.symbols.contains("n"));
    }

    #[test]
    fn test_predeclared_condition_variable_is_redeclared() {
        let ctx = check("int n = 5; DO n = 1; ENDDO WHILE (int n == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec!["Error: variable 'n' redeclared".to_string()]);
    }

    #[test]
    fn test_diagnostic_spans_point_at_names() {
        let ctx = check("int x = 5; DO x = x + k; ENDDO WHILE (int z == 0) ENDWHILE");
        match &ctx.diagnostics.all_errors()[0] {
            crate::frontend::Diagnostic::Semantic(e) => {
                assert_eq!(e.name, "k");
                assert_eq!(e.span.start.column, 23);
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    fn check_inline(source: &str) -> ParseContext {
        let mut ctx = ParseContext::new();
        {
            let mut analyzer = SemanticAnalyzer::new(&mut ctx);
            Parser::new(Lexer::new(source)).parse_program(&mut analyzer);
        }
        ctx
    }

    #[test]
    fn test_inline_matches_standalone_pass() {
        let source = "int x = 5; DO a = b * x + c; x = x; ENDDO WHILE (int z == 0) ENDWHILE";
        assert_eq!(check_inline(source).diagnostics.messages(), check(source).diagnostics.messages());
    }

    #[test]
    fn test_operands_checked_before_syntax_error() {
        let ctx = check_inline("int x = 1; DO x = q + r + s; ENDDO WHILE (int z == 0) ENDWHILE");
        assert_eq!(ctx.diagnostics.messages(), vec![
            "Error: variable 'q' is not declared".to_string(),
            "Error: variable 'r' is not declared".to_string(),
            "Syntax error at '+'".to_string(),
        ]);
    }
}
