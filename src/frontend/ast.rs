//! Abstract Syntax Tree (AST) for the DO/WHILE language.
//!
//! The tree mirrors the grammar one-to-one: a list of declarations, the
//! loop body, and the loop condition. Nodes carry no semantic information;
//! declaration checks live in [`crate::frontend::semantic`].

use crate::utils::location::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete program: `declarations DO block ENDDO WHILE (condition) ENDWHILE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Leading `int` declarations, in source order
    pub declarations: Vec<Declaration>,
    /// Statements of the loop body
    pub block: Vec<Statement>,
    /// The `WHILE (...)` header
    pub condition: Condition,
    /// Source span
    pub span: Span,
}

impl Program {
    /// Find a declaration by name.
    pub fn find_declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.declarations {
            writeln!(f, "{}", decl)?;
        }
        writeln!(f, "DO")?;
        for stmt in &self.block {
            writeln!(f, "    {}", stmt)?;
        }
        writeln!(f, "ENDDO")?;
        write!(f, "WHILE ({}) ENDWHILE", self.condition)
    }
}

/// `int name = value;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declared name
    pub name: String,
    /// Initial value. Never range-checked.
    pub value: i64,
    /// Source span
    pub span: Span,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int {} = {};", self.name, self.value)
    }
}

/// `target = expr;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Assigned variable
    pub target: String,
    /// Span of the target identifier
    pub target_span: Span,
    /// Right-hand side
    pub expr: Expr,
    /// Source span
    pub span: Span,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {};", self.target, self.expr)
    }
}

/// `int name == value` inside the `WHILE` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Variable introduced by the condition
    pub name: String,
    /// Value it is compared with
    pub value: i64,
    /// Source span
    pub span: Span,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int {} == {}", self.name, self.value)
    }
}

/// An arithmetic expression. The grammar allows one `+` over at most one
/// `*` on each side, so trees are at most three levels deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A number or a variable reference
    Leaf(Factor),
    /// `term + term`
    Add(Box<Expr>, Box<Expr>),
    /// `factor * factor`
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Build `left + right`.
    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Add(Box::new(left), Box::new(right))
    }

    /// Build `left * right`.
    pub fn mul(left: Expr, right: Expr) -> Self {
        Expr::Mul(Box::new(left), Box::new(right))
    }

    /// Source span covering the whole expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Leaf(factor) => factor.span,
            Expr::Add(l, r) | Expr::Mul(l, r) => l.span().merge(&r.span()),
        }
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Factor> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'e>(&'e self, out: &mut Vec<&'e Factor>) {
        match self {
            Expr::Leaf(factor) => out.push(factor),
            Expr::Add(l, r) | Expr::Mul(l, r) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(factor) => write!(f, "{}", factor),
            Expr::Add(l, r) => write!(f, "{} + {}", l, r),
            Expr::Mul(l, r) => write!(f, "{} * {}", l, r),
        }
    }
}

/// A single operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    /// The kind of operand
    pub kind: FactorKind,
    /// Source span
    pub span: Span,
}

impl Factor {
    /// A number literal.
    pub fn number(value: i64, span: Span) -> Self {
        Self { kind: FactorKind::Number(value), span }
    }

    /// A variable reference.
    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self { kind: FactorKind::Variable(name.into()), span }
    }

    /// The referenced name, if this is a variable.
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            FactorKind::Variable(name) => Some(name),
            FactorKind::Number(_) => None,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FactorKind::Number(n) => write!(f, "{}", n),
            FactorKind::Variable(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorKind {
    /// Integer literal
    Number(i64),
    /// Variable reference
    Variable(String),
}
