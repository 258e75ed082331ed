//! Parser for the DO/WHILE language.
//!
//! A recursive descent parser over the fixed grammar
//!
//! ```text
//! program      := declarations DO block ENDDO WHILE '(' condition ')' ENDWHILE
//! declarations := declarations declaration | declaration
//! declaration  := 'int' ID '=' NUMBER ';'
//! block        := block statement | statement
//! statement    := ID '=' expr ';'
//! expr         := term | term '+' term
//! term         := factor | factor '*' factor
//! factor       := NUMBER | ID
//! condition    := 'int' ID '==' NUMBER
//! ```
//!
//! `expr` and `term` apply their operator at most once, so `a + b + c` is a
//! syntax error. The parser only builds the tree; whoever wants to act on a
//! completed declaration, statement or condition plugs in a
//! [`ReductionSink`].
//!
//! Errors use panic-mode recovery: tokens are discarded until the parser
//! reaches a point where it can continue. After an error, further errors
//! are not reported until `error_window` tokens have been consumed.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::ParseError;
use log::{debug, trace};

/// Receives each production as soon as the parser completes it.
pub trait ReductionSink {
    /// A full `int ID = NUMBER;` was parsed.
    fn declaration(&mut self, _decl: &Declaration) {}
    /// An operand was parsed. Fires even if the enclosing statement later
    /// fails to parse.
    fn factor(&mut self, _factor: &Factor) {}
    /// A full `ID = expr;` was parsed. Its operands were already passed to
    /// [`ReductionSink::factor`].
    fn statement(&mut self, _stmt: &Statement) {}
    /// The loop condition was parsed. Always the last reduction.
    fn condition(&mut self, _cond: &Condition) {}
    /// A syntax error was reported.
    fn syntax_error(&mut self, _error: &ParseError) {}
}

/// Sink that ignores everything, for syntax-only parses.
impl ReductionSink for () {}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Number of tokens that must be consumed after a syntax error before
    /// another one is reported.
    pub error_window: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { error_window: 3 }
    }
}

/// The current token does not fit the grammar. The token is left in place
/// so the caller can report it.
#[derive(Debug)]
struct Unexpected;

type Step<T> = Result<T, Unexpected>;

/// A parser for the DO/WHILE language.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    config: ParserConfig,
    errors: Vec<ParseError>,
    /// Tokens left before syntax errors are reported again
    quiet: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser with the default configuration.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self::with_config(lexer, ParserConfig::default())
    }

    /// Create a parser with an explicit configuration.
    pub fn with_config(mut lexer: Lexer<'a>, config: ParserConfig) -> Self {
        let first_token = lexer.next_token();
        Self {
            lexer,
            current: first_token.clone(),
            previous: first_token,
            config,
            errors: Vec::new(),
            quiet: 0,
        }
    }

    /// Syntax errors reported so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The lexer driving this parser, for its lexical errors.
    pub fn lexer(&self) -> &Lexer<'a> {
        &self.lexer
    }

    /// Parse a complete program.
    ///
    /// Returns `None` when the input could not be recovered into a whole
    /// program. Productions completed before that point have already been
    /// passed to `sink`.
    pub fn parse_program(&mut self, sink: &mut dyn ReductionSink) -> Option<Program> {
        let start = self.current.span;

        let declarations = self.parse_declarations(sink)?;
        self.expect(TokenKind::Do, sink)?;
        let block = self.parse_block(sink)?;
        self.expect(TokenKind::EndDo, sink)?;
        self.expect(TokenKind::While, sink)?;
        self.expect(TokenKind::LeftParen, sink)?;
        let condition = self.parse_condition(sink)?;
        self.expect(TokenKind::RightParen, sink)?;
        self.expect(TokenKind::EndWhile, sink)?;

        if !self.is_at_end() {
            self.syntax_error(sink);
            return None;
        }

        let span = start.merge(&self.previous.span);
        match condition {
            Some(condition) if !declarations.is_empty() && !block.is_empty() => Some(Program {
                declarations,
                block,
                condition,
                span,
            }),
            _ => None,
        }
    }

    fn parse_declarations(&mut self, sink: &mut dyn ReductionSink) -> Option<Vec<Declaration>> {
        let mut declarations = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::Int => match self.parse_declaration() {
                    Ok(decl) => {
                        debug!("reduced declaration {}", decl);
                        sink.declaration(&decl);
                        declarations.push(decl);
                    }
                    Err(Unexpected) => {
                        self.syntax_error(sink);
                        self.synchronize_declaration();
                    }
                },
                TokenKind::Do => {
                    if declarations.is_empty() {
                        self.syntax_error(sink);
                    }
                    return Some(declarations);
                }
                TokenKind::Eof => {
                    self.syntax_error(sink);
                    return None;
                }
                _ => {
                    self.syntax_error(sink);
                    self.synchronize_declaration();
                }
            }
        }
    }

    fn parse_declaration(&mut self) -> Step<Declaration> {
        let start = self.current.span;
        self.consume(TokenKind::Int)?;
        let name = self.consume_identifier()?;
        self.consume(TokenKind::Assign)?;
        let value = self.consume_number()?;
        self.consume(TokenKind::Semicolon)?;

        Ok(Declaration {
            name,
            value,
            span: start.merge(&self.previous.span),
        })
    }

    fn parse_block(&mut self, sink: &mut dyn ReductionSink) -> Option<Vec<Statement>> {
        let mut block = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::Identifier => match self.parse_statement(sink) {
                    Ok(stmt) => {
                        debug!("reduced statement {}", stmt);
                        sink.statement(&stmt);
                        block.push(stmt);
                    }
                    Err(Unexpected) => {
                        self.syntax_error(sink);
                        self.synchronize_statement();
                    }
                },
                TokenKind::EndDo => {
                    if block.is_empty() {
                        self.syntax_error(sink);
                    }
                    return Some(block);
                }
                TokenKind::Eof => {
                    self.syntax_error(sink);
                    return None;
                }
                _ => {
                    self.syntax_error(sink);
                    self.synchronize_statement();
                }
            }
        }
    }

    fn parse_statement(&mut self, sink: &mut dyn ReductionSink) -> Step<Statement> {
        let start = self.current.span;
        let target = self.consume_identifier()?;
        let target_span = self.previous.span;
        self.consume(TokenKind::Assign)?;
        let expr = self.parse_expr(sink)?;
        self.consume(TokenKind::Semicolon)?;

        Ok(Statement {
            target,
            target_span,
            expr,
            span: start.merge(&self.previous.span),
        })
    }

    fn parse_expr(&mut self, sink: &mut dyn ReductionSink) -> Step<Expr> {
        let left = self.parse_term(sink)?;
        if self.match_token(TokenKind::Plus) {
            let right = self.parse_term(sink)?;
            Ok(Expr::add(left, right))
        } else {
            Ok(left)
        }
    }

    fn parse_term(&mut self, sink: &mut dyn ReductionSink) -> Step<Expr> {
        let left = self.parse_factor(sink)?;
        if self.match_token(TokenKind::Star) {
            let right = self.parse_factor(sink)?;
            Ok(Expr::mul(left, right))
        } else {
            Ok(left)
        }
    }

    fn parse_factor(&mut self, sink: &mut dyn ReductionSink) -> Step<Expr> {
        let span = self.current.span;
        let factor = match self.current.kind {
            TokenKind::Number => Factor::number(self.consume_number()?, span),
            TokenKind::Identifier => Factor::variable(self.consume_identifier()?, span),
            _ => return Err(Unexpected),
        };
        trace!("reduced factor {}", factor);
        sink.factor(&factor);
        Ok(Expr::Leaf(factor))
    }

    /// Parse the condition. A malformed condition is reported and skipped
    /// up to the closing parenthesis; `Some(None)` means it was skipped.
    fn parse_condition(&mut self, sink: &mut dyn ReductionSink) -> Option<Option<Condition>> {
        match self.parse_condition_body() {
            Ok(cond) => {
                debug!("reduced condition {}", cond);
                sink.condition(&cond);
                Some(Some(cond))
            }
            Err(Unexpected) => {
                self.syntax_error(sink);
                self.skip_until(TokenKind::RightParen, sink)?;
                Some(None)
            }
        }
    }

    fn parse_condition_body(&mut self) -> Step<Condition> {
        let start = self.current.span;
        self.consume(TokenKind::Int)?;
        let name = self.consume_identifier()?;
        self.consume(TokenKind::EqualEqual)?;
        let value = self.consume_number()?;

        Ok(Condition {
            name,
            value,
            span: start.merge(&self.previous.span),
        })
    }

    // Helper methods
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Move to the next token without counting it as consumed.
    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Consume the current token as part of a production.
    fn shift(&mut self) {
        self.advance();
        self.quiet = self.quiet.saturating_sub(1);
    }

    fn consume(&mut self, kind: TokenKind) -> Step<()> {
        if self.check(kind) {
            self.shift();
            Ok(())
        } else {
            Err(Unexpected)
        }
    }

    fn consume_identifier(&mut self) -> Step<String> {
        let name = self.current.name().map(str::to_string).ok_or(Unexpected)?;
        self.shift();
        Ok(name)
    }

    fn consume_number(&mut self) -> Step<i64> {
        if !self.check(TokenKind::Number) {
            return Err(Unexpected);
        }
        let value = self.current.number().ok_or(Unexpected)?;
        self.shift();
        Ok(value)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.shift();
            true
        } else {
            false
        }
    }

    /// Consume a fixed token of the program skeleton, discarding input up
    /// to it if it is not next. `None` if the input ends first.
    fn expect(&mut self, kind: TokenKind, sink: &mut dyn ReductionSink) -> Option<()> {
        if self.match_token(kind) {
            return Some(());
        }
        self.syntax_error(sink);
        self.skip_until(kind, sink)?;
        self.shift();
        Some(())
    }

    /// Discard tokens until `kind` is current. `None` if the input ends first.
    fn skip_until(&mut self, kind: TokenKind, sink: &mut dyn ReductionSink) -> Option<()> {
        while !self.check(kind) {
            if self.is_at_end() {
                self.syntax_error(sink);
                return None;
            }
            trace!("discarding {} while looking for {}", self.current, kind);
            self.advance();
        }
        Some(())
    }

    fn syntax_error(&mut self, sink: &mut dyn ReductionSink) {
        if self.quiet > 0 {
            trace!("suppressed syntax error at {}", self.current);
        } else {
            let error = if self.is_at_end() {
                ParseError::end_of_input(self.current.span)
            } else {
                ParseError::unexpected(&self.current.value.to_string(), self.current.span)
            };
            debug!("{}", error);
            sink.syntax_error(&error);
            self.errors.push(error);
        }
        self.quiet = self.config.error_window;
    }

    /// Skip to just after the next `;`, or to the next `int` / `DO`.
    fn synchronize_declaration(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof | TokenKind::Int | TokenKind::Do => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => {
                    trace!("discarding {}", self.current);
                    self.advance();
                }
            }
        }
    }

    /// Skip to just after the next `;`, or to `ENDDO`.
    fn synchronize_statement(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof | TokenKind::EndDo => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => {
                    trace!("discarding {}", self.current);
                    self.advance();
                }
            }
        }
    }
}
