//! The expression grammar.
//!
//! Precedence, lowest to highest, every level left-associative except
//! assignment and unary:
//!
//! assignment, `||`, `&&`, `== !=`, `> >= < <=`, `|`, `^`, `&`, `+ -`,
//! `* / %`, unary `! -`, call, primary.

use aspen_lex::TokenKind;

use crate::ast::{
    AssignmentExpr, BinaryExpr, CallExpr, CastExpr, Expr, GroupingExpr, IdentifierExpr,
    LiteralExpr, UnaryExpr,
};
use crate::{ParseResult, Parser};

impl<'r, 'src> Parser<'r, 'src> {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// `IDENT '=' assignment` when the token after the identifier is `=`,
    /// otherwise the binary-operator chain.
    fn assignment(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Equal) {
            let name = self.advance().clone();
            self.advance(); // '='
            let value = self.assignment()?;
            return Ok(Expr::Assignment(AssignmentExpr {
                name,
                value: Box::new(value),
                depth: None,
            }));
        }
        self.logic_or()
    }

    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::PipePipe], Self::logic_and)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::AmpAmp], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::bit_or,
        )
    }

    fn bit_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Pipe], Self::bit_xor)
    }

    fn bit_xor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Caret], Self::bit_and)
    }

    fn bit_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Amp], Self::term)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::unary,
        )
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
            }));
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.check(TokenKind::LeftParen) {
            let loc = self.advance().clone();
            let mut arguments = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    arguments.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "expected ')' after arguments.")?;
            expr = Expr::Call(CallExpr {
                callee: Box::new(expr),
                arguments,
                loc,
            });
        }

        Ok(expr)
    }

    /// Literal, grouping, identifier, or a type cast `type '(' expr ')'`.
    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[
            TokenKind::False,
            TokenKind::True,
            TokenKind::IntLiteral,
            TokenKind::FloatLiteral,
            TokenKind::StringLiteral,
        ]) {
            return Ok(Expr::Literal(LiteralExpr {
                value: self.previous().clone(),
            }));
        }

        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Identifier(IdentifierExpr {
                name: self.previous().clone(),
                depth: None,
            }));
        }

        if self.matches(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "expected ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingExpr {
                expr: Box::new(expr),
            }));
        }

        if matches!(
            self.peek().kind,
            TokenKind::I64 | TokenKind::U64 | TokenKind::Bool | TokenKind::String | TokenKind::Double
        ) {
            let loc = self.peek().clone();
            let to = self.parse_type()?;
            self.consume(TokenKind::LeftParen, "expected '(' after type.")?;
            let value = self.expression()?;
            self.consume(TokenKind::RightParen, "expected ')' after expression.")?;
            return Ok(Expr::Cast(CastExpr {
                to,
                from: None,
                value: Box::new(value),
                loc,
            }));
        }

        Err(self.error(self.peek(), "expected expression."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspen_lex::scan_tokens;
    use aspen_util::Reporter;

    fn expr_sexpr(source: &str) -> String {
        let chars: Vec<char> = format!("{source};").chars().collect();
        let mut reporter = Reporter::new(&chars);
        let tokens = scan_tokens(&chars, &mut reporter);
        let program = crate::parse(tokens, &mut reporter);
        assert!(!reporter.had_error(), "{}", reporter.render());
        match &program.0[0] {
            crate::Stmt::Expression(stmt) => stmt.expr.to_string(),
            other => panic!("expected an expression statement, got {other}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(expr_sexpr("1 + 2 * 3"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn same_level_operators_are_left_associative() {
        assert_eq!(expr_sexpr("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(expr_sexpr("8 / 4 / 2"), "(/ (/ 8 4) 2)");
    }

    #[test]
    fn comparison_binds_looser_than_bitwise() {
        assert_eq!(expr_sexpr("1 < 2 | 3"), "(< 1 (| 2 3))");
        assert_eq!(expr_sexpr("1 | 2 ^ 3 & 4"), "(| 1 (^ 2 (& 3 4)))");
    }

    #[test]
    fn logical_operators_bind_loosest() {
        assert_eq!(
            expr_sexpr("a == b && c != d || e"),
            "(|| (&& (== (identifier a) (identifier b)) (!= (identifier c) (identifier d))) (identifier e))"
        );
    }

    #[test]
    fn unary_is_right_associative() {
        assert_eq!(expr_sexpr("!!x"), "(! (! (identifier x)))");
        assert_eq!(expr_sexpr("--1"), "(- (- 1))");
        assert_eq!(expr_sexpr("-1 * 2"), "(* (- 1) 2)");
    }

    #[test]
    fn grouping() {
        assert_eq!(expr_sexpr("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            expr_sexpr("a = b = 1"),
            "(= (identifier a) (= (identifier b) 1))"
        );
    }

    #[test]
    fn equality_with_identifier_on_the_left_is_not_assignment() {
        assert_eq!(
            expr_sexpr("a == 1"),
            "(== (identifier a) 1)"
        );
    }

    #[test]
    fn calls_chain_and_take_arguments() {
        assert_eq!(expr_sexpr("f()"), "(call (identifier f))");
        assert_eq!(
            expr_sexpr("f(1, x)(2)"),
            "(call (call (identifier f) 1 (identifier x)) 2)"
        );
    }

    #[test]
    fn type_casts() {
        assert_eq!(expr_sexpr("double(1)"), "(cast double 1)");
        assert_eq!(
            expr_sexpr("u64(x + 1)"),
            "(cast u64 (+ (identifier x) 1))"
        );
    }

    #[test]
    fn string_and_float_literals_render_canonically() {
        assert_eq!(expr_sexpr("\"hi\" + \"there\""), "(+ \"hi\" \"there\")");
        assert_eq!(expr_sexpr("1.5 * 2.0"), "(* 1.50 2.00)");
    }
}
