//! aspen-par - Recursive-descent parser for Aspen.
//!
//! The parser consumes the token stream minus comment tokens and produces
//! a [`Program`]. A syntax error aborts only the statement it occurred in:
//! the error is recorded, the parser resynchronizes at the next statement
//! boundary, and parsing continues so several errors can be collected in
//! one pass.

mod ast;
mod expr;
mod printer;
mod stmt;
mod types;

pub use ast::{
    AssignmentExpr, BinaryExpr, BlockStmt, CallExpr, CastExpr, Expr, ExpressionStmt, FunctionStmt,
    GroupingExpr, IdentifierExpr, IfStmt, LetStmt, LiteralExpr, PrintStmt, Program, ReturnStmt,
    Stmt, UnaryExpr, WhileStmt,
};
pub use types::{FunctionType, Type};

use aspen_lex::{Token, TokenKind, TokenStream};
use aspen_util::{ErrorData, Reporter};

pub(crate) type ParseResult<T> = Result<T, ErrorData>;

/// Parses the token stream into a program.
pub fn parse<'src>(tokens: TokenStream, reporter: &mut Reporter<'src>) -> Program {
    let tokens = tokens
        .0
        .into_iter()
        .filter(|token| token.kind != TokenKind::Comment)
        .collect();

    Parser {
        tokens,
        current: 0,
        reporter,
    }
    .parse_program()
}

pub(crate) struct Parser<'r, 'src> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'r mut Reporter<'src>,
}

impl<'r, 'src> Parser<'r, 'src> {
    fn parse_program(mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.reporter.report(error);
                    self.synchronize();
                }
            }
        }
        Program(statements)
    }

    /// Discards tokens until just past a semicolon or just before the start
    /// of a statement, so one syntax error does not cascade.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.advance().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Fn
                | TokenKind::Let
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    pub(crate) fn check_next(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.tokens[self.current + 1].kind == kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error(self.peek(), message))
    }

    pub(crate) fn error(&self, token: &Token, message: &str) -> ErrorData {
        ErrorData::new(token.line, token.col, message)
    }
}
