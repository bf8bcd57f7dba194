//! The statement grammar.
//!
//! `for` loops are desugared here: `for (init; cond; incr) { body }`
//! becomes `{ init; while (cond) { body; incr; } }`, with the condition
//! defaulting to `true` when absent.

use aspen_lex::{Token, TokenKind, TokenValue};

use crate::ast::{
    BlockStmt, Expr, ExpressionStmt, FunctionStmt, IfStmt, LetStmt, LiteralExpr, PrintStmt,
    ReturnStmt, Stmt, WhileStmt,
};
use crate::types::FunctionType;
use crate::{ParseResult, Parser};

impl<'r, 'src> Parser<'r, 'src> {
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Let]) {
            return self.let_statement();
        }
        if self.matches(&[TokenKind::Fn]) {
            return self.function_statement();
        }
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        self.expression_statement()
    }

    /// `'let' IDENT type ('=' expr)? ';'`
    fn let_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "expected variable name.")?;
        let ty = self.parse_type()?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "expected ';' after variable declaration.")?;
        Ok(Stmt::Let(LetStmt {
            name,
            ty,
            initializer,
        }))
    }

    /// `'fn' IDENT '(' (IDENT type (',' IDENT type)*)? ')' returnType block`
    fn function_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "expected function name.")?;
        self.consume(TokenKind::LeftParen, "expected '(' after function name.")?;

        let mut parameters = Vec::new();
        let mut parameter_types = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                parameters.push(self.consume(TokenKind::Identifier, "expected parameter name.")?);
                parameter_types.push(self.parse_type()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "expected ')' after parameters.")?;

        let return_type = self.parse_return_type()?;
        self.consume(TokenKind::LeftBrace, "expected '{' before function body.")?;
        let body = self.block()?;

        Ok(Stmt::Function(FunctionStmt {
            name,
            parameters,
            body,
            ty: FunctionType::new(parameter_types, return_type),
        }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.previous().clone();
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "expected ';' after value.")?;
        Ok(Stmt::Print(PrintStmt { expr, loc }))
    }

    /// The statements up to the closing brace; the opening brace has
    /// already been consumed.
    pub(crate) fn block(&mut self) -> ParseResult<BlockStmt> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.consume(TokenKind::RightBrace, "expected '}' after block.")?;
        Ok(BlockStmt { statements })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.previous().clone();
        self.consume(TokenKind::LeftParen, "expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after condition.")?;
        self.consume(TokenKind::LeftBrace, "expected '{' after condition.")?;
        let then_branch = Box::new(Stmt::Block(self.block()?));

        let else_branch = if self.matches(&[TokenKind::Else]) {
            if self.matches(&[TokenKind::If]) {
                Some(Box::new(self.if_statement()?))
            } else {
                self.consume(TokenKind::LeftBrace, "expected '{' after 'else'.")?;
                Some(Box::new(Stmt::Block(self.block()?)))
            }
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            loc,
        }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.previous().clone();
        self.consume(TokenKind::LeftParen, "expected '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after condition.")?;
        self.consume(TokenKind::LeftBrace, "expected '{' after condition.")?;
        let body = Box::new(Stmt::Block(self.block()?));

        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            loc,
        }))
    }

    /// `'for' '(' (let | exprStmt | ';') expr? ';' expr? ')' block`,
    /// desugared to a while loop on the spot.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.previous().clone();
        self.consume(TokenKind::LeftParen, "expected '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Let]) {
            Some(self.let_statement()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "expected ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "expected ')' after for clauses.")?;

        self.consume(TokenKind::LeftBrace, "expected '{' before loop body.")?;
        let mut body = self.block()?;

        if let Some(increment) = increment {
            body.statements
                .push(Stmt::Expression(ExpressionStmt { expr: increment }));
        }

        let condition = condition.unwrap_or_else(|| {
            Expr::Literal(LiteralExpr {
                value: Token {
                    kind: TokenKind::True,
                    line: loc.line,
                    col: loc.col,
                    value: TokenValue::None,
                },
            })
        });

        let desugared = Stmt::While(WhileStmt {
            condition,
            body: Box::new(Stmt::Block(body)),
            loc,
        });

        Ok(match initializer {
            Some(initializer) => Stmt::Block(BlockStmt {
                statements: vec![initializer, desugared],
            }),
            None => desugared,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.previous().clone();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "expected ';' after return value.")?;
        Ok(Stmt::Return(ReturnStmt { value, loc }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "expected ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionStmt { expr }))
    }
}

#[cfg(test)]
mod tests {
    use aspen_lex::scan_tokens;
    use aspen_util::Reporter;

    use crate::{parse, Program, Type};

    fn parsed(source: &str) -> Program {
        let chars: Vec<char> = source.chars().collect();
        let mut reporter = Reporter::new(&chars);
        let tokens = scan_tokens(&chars, &mut reporter);
        let program = parse(tokens, &mut reporter);
        assert!(!reporter.had_error(), "{}", reporter.render());
        program
    }

    fn sexpr(source: &str) -> String {
        parsed(source).to_string()
    }

    #[test]
    fn let_with_and_without_initializer() {
        assert_eq!(sexpr("let x i64 = 1;"), "((let x i64 1))");
        assert_eq!(sexpr("let s string;"), "((let s string))");
        assert_eq!(sexpr("let xs i64[] = f();"), "((let xs i64[] (call (identifier f))))");
    }

    #[test]
    fn function_declarations() {
        assert_eq!(
            sexpr("fn nop() void { }"),
            "((fn nop (return void)))"
        );
        assert_eq!(
            sexpr("fn greet(name string) string { return name; }"),
            "((fn greet (return string) (param name string) (return (identifier name))))"
        );
    }

    #[test]
    fn function_typed_declarations() {
        assert_eq!(
            sexpr("let f fn() i64 = g;"),
            "((let f fn()i64 (identifier g)))"
        );
        assert_eq!(
            sexpr("let fs (fn() i64)[] = g;"),
            "((let fs (fn()i64)[] (identifier g)))"
        );
    }

    #[test]
    fn if_with_else_if_chain() {
        assert_eq!(
            sexpr("if (a) { print 1; } else if (b) { print 2; } else { print 3; }"),
            "((if (identifier a) (block (print 1)) (if (identifier b) (block (print 2)) (block (print 3)))))"
        );
    }

    #[test]
    fn while_loop() {
        assert_eq!(
            sexpr("while (i < 3) { i = i + 1; }"),
            "((while (< (identifier i) 3) (block (expr (= (identifier i) (+ (identifier i) 1))))))"
        );
    }

    #[test]
    fn for_desugars_to_while_in_a_block() {
        assert_eq!(
            sexpr("for (let i i64 = 0; i < 3; i = i + 1) { print i; }"),
            "((block (let i i64 0) (while (< (identifier i) 3) (block (print (identifier i)) (expr (= (identifier i) (+ (identifier i) 1)))))))"
        );
    }

    #[test]
    fn bare_for_desugars_to_while_true() {
        assert_eq!(
            sexpr("for (;;) { print 1; }"),
            "((while true (block (print 1))))"
        );
    }

    #[test]
    fn for_without_initializer_keeps_no_outer_block() {
        assert_eq!(
            sexpr("for (; i < 3;) { print i; }"),
            "((while (< (identifier i) 3) (block (print (identifier i)))))"
        );
    }

    #[test]
    fn return_with_and_without_value() {
        assert_eq!(
            sexpr("fn f() void { return; }"),
            "((fn f (return void) (return)))"
        );
        assert_eq!(
            sexpr("fn g() i64 { return 1; }"),
            "((fn g (return i64) (return 1)))"
        );
    }

    #[test]
    fn nested_blocks() {
        assert_eq!(
            sexpr("{ let x i64 = 1; { print x; } }"),
            "((block (let x i64 1) (block (print (identifier x)))))"
        );
    }

    #[test]
    fn parsed_types_round_trip_through_display() {
        let program = parsed("let f fn(i64, string) bool = g;");
        match &program.0[0] {
            crate::Stmt::Let(stmt) => {
                assert_eq!(
                    stmt.ty,
                    Type::function(vec![Type::I64, Type::String], Type::Bool)
                );
            }
            other => panic!("expected a let statement, got {other}"),
        }
    }
}
