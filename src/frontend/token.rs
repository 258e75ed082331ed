//! Token types for the DO/WHILE language.
//!
//! This module defines all token types produced by the lexer.

use crate::utils::location::Span;
use serde::Serialize;
use std::fmt;

/// A token in the source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Integer value for numbers, lexeme for everything else
    pub value: TokenValue,
    /// The source span
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, value: TokenValue, span: Span) -> Self {
        Self { kind, value, span }
    }

    /// Check if this is the end-of-input marker.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Check if this token is a reserved word.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    /// The identifier name, if this is an identifier.
    pub fn name(&self) -> Option<&str> {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, TokenValue::Text(name)) => Some(name),
            _ => None,
        }
    }

    /// The integer value, if this is a number.
    pub fn number(&self) -> Option<i64> {
        match self.value {
            TokenValue::Int(n) => Some(n),
            TokenValue::Text(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at {}", self.kind.label(), self.value, self.span.start)
    }
}

/// The payload of a token, resolved when the token is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Parsed value of a `NUMBER`
    Int(i64),
    /// Raw text of any other token
    Text(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Int(n) => write!(f, "{}", n),
            TokenValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Variable name
    Identifier,
    /// Integer literal
    Number,

    // Keywords
    /// `int`
    Int,
    /// `DO`
    Do,
    /// `ENDDO`
    EndDo,
    /// `WHILE`
    While,
    /// `ENDWHILE`
    EndWhile,

    // Operators and punctuation
    /// `=`
    Assign,
    /// `==`
    EqualEqual,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `;`
    Semicolon,

    /// End of input; never yielded by the token iterator
    Eof,
}

impl TokenKind {
    /// Check if this is a reserved word.
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(self, Int | Do | EndDo | While | EndWhile)
    }

    /// Check if this is an operator or punctuation mark.
    pub fn is_symbol(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Assign | EqualEqual | Plus | Star | LeftParen | RightParen | Semicolon
        )
    }

    /// Get the keyword for a word, if it is reserved. Case-sensitive.
    pub fn keyword(s: &str) -> Option<TokenKind> {
        match s {
            "int" => Some(TokenKind::Int),
            "DO" => Some(TokenKind::Do),
            "ENDDO" => Some(TokenKind::EndDo),
            "WHILE" => Some(TokenKind::While),
            "ENDWHILE" => Some(TokenKind::EndWhile),
            _ => None,
        }
    }

    /// Grammar terminal name, as used in token listings.
    pub fn label(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Identifier => "ID",
            Number => "NUMBER",
            Int => "INT",
            Do => "DO",
            EndDo => "ENDDO",
            While => "WHILE",
            EndWhile => "ENDWHILE",
            Assign => "ASSIGN",
            EqualEqual => "EQUALS",
            Plus => "PLUS",
            Star => "TIMES",
            LeftParen => "LPAREN",
            RightParen => "RPAREN",
            Semicolon => "SEMICOLON",
            Eof => "EOF",
        }
    }

    /// Human-readable spelling for messages.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Identifier => "identifier",
            Number => "number",
            Int => "int",
            Do => "DO",
            EndDo => "ENDDO",
            While => "WHILE",
            EndWhile => "ENDWHILE",
            Assign => "=",
            EqualEqual => "==",
            Plus => "+",
            Star => "*",
            LeftParen => "(",
            RightParen => ")",
            Semicolon => ";",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("DO"), Some(TokenKind::Do));
        assert_eq!(TokenKind::keyword("ENDWHILE"), Some(TokenKind::EndWhile));
        assert_eq!(TokenKind::keyword("int"), Some(TokenKind::Int));
        assert_eq!(TokenKind::keyword("do"), None);
        assert_eq!(TokenKind::keyword("INT"), None);
    }

    #[test]
    fn test_kind_groups_are_disjoint() {
        use TokenKind::*;
        let all = [
            Identifier, Number, Int, Do, EndDo, While, EndWhile, Assign, EqualEqual, Plus,
            Star, LeftParen, RightParen, Semicolon,
        ];
        for kind in all {
            let groups = [
                kind == Identifier,
                kind == Number,
                kind.is_keyword(),
                kind.is_symbol(),
            ];
            assert_eq!(groups.iter().filter(|g| **g).count(), 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_token_accessors() {
        let id = Token::new(TokenKind::Identifier, TokenValue::Text("x".into()), Span::dummy());
        assert_eq!(id.name(), Some("x"));
        assert_eq!(id.number(), None);

        let num = Token::new(TokenKind::Number, TokenValue::Int(42), Span::dummy());
        assert_eq!(num.number(), Some(42));
        assert_eq!(num.name(), None);
        assert_eq!(num.value.to_string(), "42");
    }
}
