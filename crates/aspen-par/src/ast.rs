//! The syntax tree.
//!
//! Nodes own their children. The `depth` slots on identifiers and
//! assignments start out unset; semantic analysis fills them in so the
//! evaluator can do direct-indexed environment lookups.

use std::fmt;

use aspen_lex::Token;

use crate::printer;
use crate::types::{FunctionType, Type};

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Literal(LiteralExpr),
    Grouping(GroupingExpr),
    Identifier(IdentifierExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Cast(CastExpr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub operator: Token,
    pub operand: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiteralExpr {
    pub value: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupingExpr {
    pub expr: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentifierExpr {
    pub name: Token,
    /// Hops from the innermost scope to the scope binding `name`; set by
    /// semantic analysis.
    pub depth: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentExpr {
    pub name: Token,
    pub value: Box<Expr>,
    pub depth: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    /// The opening parenthesis, for call-site diagnostics.
    pub loc: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CastExpr {
    pub to: Type,
    /// The operand's type; set by semantic analysis (or directly for
    /// synthesized casts) and used by the evaluator to pick the coercion.
    pub from: Option<Type>,
    pub value: Box<Expr>,
    pub loc: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Print(PrintStmt),
    Let(LetStmt),
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    Function(FunctionStmt),
    Return(ReturnStmt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStmt {
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintStmt {
    pub expr: Expr,
    pub loc: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LetStmt {
    pub name: Token,
    pub ty: Type,
    /// `None` only between parsing and analysis; the checker synthesizes a
    /// default literal when the declaration has no initializer.
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub loc: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub loc: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionStmt {
    pub name: Token,
    pub parameters: Vec<Token>,
    pub body: BlockStmt,
    pub ty: FunctionType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: Token,
}

/// A parsed program: the ordered sequence of top-level statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program(pub Vec<Stmt>);

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print_expr(self))
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print_stmt(self))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print_program(self))
    }
}
