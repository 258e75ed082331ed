//! Lexer for the DO/WHILE language.
//!
//! The lexer converts source text into a stream of tokens. Lexical errors
//! never stop it: each one is logged, kept in [`Lexer::errors`], and the
//! offending input is skipped.

use crate::frontend::token::{Token, TokenKind, TokenValue};
use crate::utils::errors::{LexerError, LexerErrorKind};
use crate::utils::location::{SourceLocation, Span};
use log::warn;
use std::iter::Peekable;
use std::str::Chars;

/// A lexer for tokenizing source code.
pub struct Lexer<'a> {
    /// The source text
    source: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte offset
    offset: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Start of current token
    token_start: SourceLocation,
    /// Lexical errors seen so far
    errors: Vec<LexerError>,
    /// Whether we've hit EOF
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
            errors: Vec::new(),
            at_eof: false,
        }
    }

    /// Lexical errors reported so far, in scan order.
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    fn mark_token_start(&mut self) {
        self.token_start = self.current_location();
    }

    fn make_span(&self) -> Span {
        Span::new(self.token_start, self.current_location())
    }

    /// Span of `len` bytes starting at the token start, on a single line.
    fn fragment_span(&self, len: usize) -> Span {
        let start = self.token_start;
        let end = SourceLocation::new(start.line, start.column + len, start.offset + len);
        Span::new(start, end)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip spaces and tabs. Newlines are not blanks in this language.
    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        let lexeme = &self.source[span.start.offset..span.end.offset];
        Token::new(kind, TokenValue::Text(lexeme.to_string()), span)
    }

    fn report(&mut self, kind: LexerErrorKind, message: String, span: Span) {
        let error = LexerError { message, span, kind };
        warn!("{}", error);
        self.errors.push(error);
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '_')
            .unwrap_or(false)
        {
            self.advance();
        }

        let span = self.make_span();
        let lexeme = &self.source[span.start.offset..span.end.offset];
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, TokenValue::Text(lexeme.to_string()), span)
    }

    /// Scan a digit run. Returns `None` when the run was rejected.
    ///
    /// Digits followed by a dot are a float attempt: the error names the
    /// whole `\d+\.` fragment but only one character is consumed, so the
    /// rest of the literal is scanned again and reports its own error.
    fn scan_number(&mut self) -> Option<Token> {
        let source = self.source;
        let rest = &source[self.offset..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();

        if rest[digits..].starts_with('.') {
            let fragment = &rest[..=digits];
            let span = self.fragment_span(fragment.len());
            self.advance();
            self.report(
                LexerErrorKind::FloatLiteral,
                format!("Floating-point literal '{}' is not allowed", fragment),
                span,
            );
            return None;
        }

        for _ in 0..digits {
            self.advance();
        }
        let span = self.make_span();
        let lexeme = &source[span.start.offset..span.end.offset];
        match lexeme.parse::<i64>() {
            Ok(value) => Some(Token::new(TokenKind::Number, TokenValue::Int(value), span)),
            Err(_) => {
                self.report(
                    LexerErrorKind::IntegerOverflow,
                    format!("Integer literal '{}' is out of range", lexeme),
                    span,
                );
                None
            }
        }
    }

    /// Reject a `\.\d+` fragment. The fractional digits go with it.
    fn scan_dot_fraction(&mut self) {
        self.advance();
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }
        let source = self.source;
        let span = self.make_span();
        let fragment = &source[span.start.offset..span.end.offset];
        self.report(
            LexerErrorKind::FloatLiteral,
            format!("Floating-point literal '{}' is not allowed", fragment),
            span,
        );
    }

    /// Scan the next token, returning an `Eof` token at the end of input.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_blanks();
            self.mark_token_start();

            let c = match self.peek() {
                Some(c) => c,
                None => {
                    self.at_eof = true;
                    return self.make_token(TokenKind::Eof);
                }
            };

            if c.is_ascii_alphabetic() || c == '_' {
                return self.scan_identifier();
            }
            if c == '.' && self.peek_next().map(|n| n.is_ascii_digit()).unwrap_or(false) {
                self.scan_dot_fraction();
                continue;
            }
            if c.is_ascii_digit() {
                match self.scan_number() {
                    Some(token) => return token,
                    None => continue,
                }
            }

            self.advance();
            let kind = match c {
                '=' => {
                    if self.match_char('=') {
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Assign
                    }
                }
                '+' => TokenKind::Plus,
                '*' => TokenKind::Star,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                ';' => TokenKind::Semicolon,
                _ => {
                    let span = self.make_span();
                    self.report(
                        LexerErrorKind::IllegalCharacter,
                        format!("Illegal character '{}'", c.escape_default()),
                        span,
                    );
                    continue;
                }
            };
            return self.make_token(kind);
        }
    }

    /// Check if we've reached EOF.
    pub fn is_at_end(&self) -> bool {
        self.at_eof
    }

    /// Drain the lexer, returning every token and every lexical error.
    pub fn lex_all(mut self) -> (Vec<Token>, Vec<LexerError>) {
        let tokens: Vec<Token> = self.by_ref().collect();
        (tokens, self.errors)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_eof {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, Vec<LexerError>) {
        Lexer::new(source).lex_all()
    }

    fn token_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty() {
        let (tokens, errors) = lex("");
        assert!(tokens.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blanks() {
        let (tokens, errors) = lex("  \t  ");
        assert!(tokens.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_keywords() {
        let kinds = token_kinds("int DO ENDDO WHILE ENDWHILE");
        assert_eq!(kinds, vec![
            TokenKind::Int,
            TokenKind::Do,
            TokenKind::EndDo,
            TokenKind::While,
            TokenKind::EndWhile,
        ]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let kinds = token_kinds("Int do EndDo while_ DOx");
        assert!(kinds.iter().all(|k| *k == TokenKind::Identifier));
        assert_eq!(kinds.len(), 5);
    }

    #[test]
    fn test_identifiers() {
        let (tokens, _) = lex("foo _bar x123");
        assert_eq!(tokens[0].name(), Some("foo"));
        assert_eq!(tokens[1].name(), Some("_bar"));
        assert_eq!(tokens[2].name(), Some("x123"));
    }

    #[test]
    fn test_numbers() {
        let (tokens, errors) = lex("0 42 007");
        assert!(errors.is_empty());
        let values: Vec<_> = tokens.iter().map(|t| t.number()).collect();
        assert_eq!(values, vec![Some(0), Some(42), Some(7)]);
    }

    #[test]
    fn test_operators() {
        let kinds = token_kinds("= == + * ( ) ;");
        assert_eq!(kinds, vec![
            TokenKind::Assign,
            TokenKind::EqualEqual,
            TokenKind::Plus,
            TokenKind::Star,
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::Semicolon,
        ]);
    }

    #[test]
    fn test_triple_equals() {
        assert_eq!(token_kinds("==="), vec![TokenKind::EqualEqual, TokenKind::Assign]);
    }

    #[test]
    fn test_float_literal_cascade() {
        let (tokens, errors) = lex("3.14");
        assert!(tokens.is_empty());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == LexerErrorKind::FloatLiteral));
        assert!(errors[0].message.contains("'3.'"));
        assert!(errors[1].message.contains("'.14'"));
    }

    #[test]
    fn test_multi_digit_float_reports_each_run() {
        let (tokens, errors) = lex("12.5");
        assert!(tokens.is_empty());
        let fragments: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        assert_eq!(fragments.len(), 3);
        assert!(fragments[0].contains("'12.'"));
        assert!(fragments[1].contains("'2.'"));
        assert!(fragments[2].contains("'.5'"));
    }

    #[test]
    fn test_leading_dot_fraction() {
        let (tokens, errors) = lex("x = .5;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.start.column, 5);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Assign, TokenKind::Semicolon]);
    }

    #[test]
    fn test_illegal_characters_are_skipped() {
        let (tokens, errors) = lex("x @ y $");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, LexerErrorKind::IllegalCharacter);
        assert_eq!(errors[0].message, "Illegal character '@'");
    }

    #[test]
    fn test_newline_is_illegal_but_tracked() {
        let (tokens, errors) = lex("foo\nbar");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Illegal character '\\n'");
        assert_eq!(tokens[0].span.start.line, 1);
        assert_eq!(tokens[1].span.start.line, 2);
        assert_eq!(tokens[1].span.start.column, 1);
    }

    #[test]
    fn test_integer_overflow() {
        let (tokens, errors) = lex("99999999999999999999 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexerErrorKind::IntegerOverflow);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].number(), Some(1));
    }

    #[test]
    fn test_iterator_stops_at_end() {
        let mut lexer = Lexer::new("a");
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_none());
        assert!(lexer.is_at_end());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_next_token_repeats_eof() {
        let mut lexer = Lexer::new("");
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn test_complete_program() {
        let source = "int x = 5; DO x = x + 1; ENDDO WHILE (int y == 10) ENDWHILE";
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 21);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndWhile));
    }
}
