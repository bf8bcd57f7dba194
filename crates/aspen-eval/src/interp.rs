//! The tree walker.
//!
//! Expressions evaluate to plain values; statements may raise a single
//! non-local transfer, `Signal::Return`, which is caught at the call
//! boundary. Scope-entering constructs restore the enclosing environment
//! on every exit path, the return transfer included.

use std::io::Write;
use std::rc::Rc;

use aspen_lex::{Token, TokenKind};
use aspen_par::{Expr, Program, Stmt};
use aspen_sem::Environment;

use crate::cast::CastRegistry;
use crate::native::NativeRegistry;
use crate::value::{UserFunction, Value};

/// The non-local control transfer raised by `return`.
enum Signal<'ast> {
    Return(Value<'ast>),
}

type Flow<'ast> = Result<(), Signal<'ast>>;

/// Executes an analyzed program. `print` output goes to `out`; the global
/// scope is seeded from the native registry.
pub fn interpret<'ast, W: Write>(program: &'ast Program, natives: &NativeRegistry, out: W) {
    let globals = Environment::new();
    for (name, function) in natives.iter() {
        globals.define(name, Value::Native(Rc::clone(function)));
    }

    let mut interpreter = Interpreter {
        environment: globals,
        casts: CastRegistry::standard(),
        out,
    };

    for stmt in &program.0 {
        if interpreter.execute(stmt).is_err() {
            unreachable!("Interpreter: return signal escaped top level code");
        }
    }
}

struct Interpreter<'ast, W> {
    environment: Environment<Value<'ast>>,
    casts: CastRegistry,
    out: W,
}

impl<'ast, W: Write> Interpreter<'ast, W> {
    fn execute(&mut self, stmt: &'ast Stmt) -> Flow<'ast> {
        match stmt {
            Stmt::Expression(s) => {
                self.evaluate(&s.expr);
                Ok(())
            }
            Stmt::Print(s) => {
                let value = self.evaluate(&s.expr);
                let _ = writeln!(self.out, "{value}");
                Ok(())
            }
            Stmt::Let(s) => {
                let initializer = s
                    .initializer
                    .as_ref()
                    .unwrap_or_else(|| unreachable!("Interpreter: let without initializer"));
                let value = self.evaluate(initializer);
                self.environment.define(s.name.identifier(), value);
                Ok(())
            }
            Stmt::Block(s) => {
                let environment = Environment::with_enclosing(&self.environment);
                self.execute_block(&s.statements, environment)
            }
            Stmt::If(s) => {
                if self.condition(&s.condition) {
                    self.execute(&s.then_branch)
                } else if let Some(else_branch) = &s.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(s) => {
                while self.condition(&s.condition) {
                    self.execute(&s.body)?;
                }
                Ok(())
            }
            Stmt::Function(s) => {
                // the closure shares the defining scope, so the binding
                // created here is visible to the body; that is what makes
                // plain recursion work
                let function = UserFunction {
                    declaration: s,
                    closure: self.environment.clone(),
                };
                self.environment
                    .define(s.name.identifier(), Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.evaluate(expr),
                    None => Value::Unit,
                };
                Err(Signal::Return(value))
            }
        }
    }

    fn condition(&mut self, expr: &'ast Expr) -> bool {
        match self.evaluate(expr) {
            Value::Bool(value) => value,
            other => unreachable!("Interpreter: condition evaluated to {other:?}"),
        }
    }

    /// Runs `statements` inside `environment`, restoring the enclosing
    /// environment whether the block falls off the end or a return passes
    /// through.
    fn execute_block(
        &mut self,
        statements: &'ast [Stmt],
        environment: Environment<Value<'ast>>,
    ) -> Flow<'ast> {
        let enclosing = std::mem::replace(&mut self.environment, environment);
        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));
        self.environment = enclosing;
        result
    }

    fn evaluate(&mut self, expr: &'ast Expr) -> Value<'ast> {
        match expr {
            Expr::Literal(e) => self.literal(&e.value),
            Expr::Grouping(e) => self.evaluate(&e.expr),
            Expr::Unary(e) => {
                let operand = self.evaluate(&e.operand);
                match e.operator.kind {
                    TokenKind::Bang => match operand {
                        Value::Bool(value) => Value::Bool(!value),
                        other => unreachable!("Interpreter: !{other:?}"),
                    },
                    TokenKind::Minus => operand.negate(),
                    kind => unreachable!("Interpreter: unary operator {kind:?}"),
                }
            }
            Expr::Binary(e) => {
                let lhs = self.evaluate(&e.left);
                let rhs = self.evaluate(&e.right);
                self.binary(&e.operator, lhs, rhs)
            }
            Expr::Identifier(e) => {
                let depth = e
                    .depth
                    .unwrap_or_else(|| unreachable!("Interpreter: unresolved identifier"));
                self.environment.get_at(e.name.identifier(), depth)
            }
            Expr::Assignment(e) => {
                let value = self.evaluate(&e.value);
                let depth = e
                    .depth
                    .unwrap_or_else(|| unreachable!("Interpreter: unresolved assignment"));
                self.environment
                    .assign_at(e.name.identifier(), depth, value.clone());
                value
            }
            Expr::Call(e) => {
                let callee = self.evaluate(&e.callee);
                let arguments: Vec<Value<'ast>> =
                    e.arguments.iter().map(|argument| self.evaluate(argument)).collect();
                match callee {
                    Value::Native(function) => (function.imp)(&arguments),
                    Value::Function(function) => self.call(&function, arguments),
                    other => unreachable!("Interpreter: calling {other:?}"),
                }
            }
            Expr::Cast(e) => {
                let value = self.evaluate(&e.value);
                let from = e
                    .from
                    .as_ref()
                    .unwrap_or_else(|| unreachable!("Interpreter: cast without source type"));
                self.casts.coerce(from, &e.to, value)
            }
        }
    }

    /// Both operands are already evaluated: `&&` and `||` do not
    /// short-circuit.
    fn binary(&mut self, operator: &Token, lhs: Value<'ast>, rhs: Value<'ast>) -> Value<'ast> {
        match operator.kind {
            TokenKind::AmpAmp => match (lhs, rhs) {
                (Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
                (a, b) => unreachable!("Interpreter: {a:?} && {b:?}"),
            },
            TokenKind::PipePipe => match (lhs, rhs) {
                (Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),
                (a, b) => unreachable!("Interpreter: {a:?} || {b:?}"),
            },
            TokenKind::EqualEqual => Value::Bool(lhs == rhs),
            TokenKind::BangEqual => Value::Bool(lhs != rhs),
            TokenKind::Greater => lhs.greater(rhs),
            TokenKind::GreaterEqual => lhs.greater_equal(rhs),
            TokenKind::Less => lhs.less(rhs),
            TokenKind::LessEqual => lhs.less_equal(rhs),
            TokenKind::Pipe => lhs.bit_or(rhs),
            TokenKind::Caret => lhs.bit_xor(rhs),
            TokenKind::Amp => lhs.bit_and(rhs),
            TokenKind::Minus => lhs.subtract(rhs),
            TokenKind::Slash => lhs.divide(rhs),
            TokenKind::Star => lhs.multiply(rhs),
            TokenKind::Percent => lhs.remainder(rhs),
            TokenKind::Plus => lhs.add(rhs),
            kind => unreachable!("Interpreter: binary operator {kind:?}"),
        }
    }

    /// Calls a user function: fresh environment under the captured closure,
    /// arguments bound by parameter name, body executed there. A return
    /// transfer carries the result; falling off the end yields the unit
    /// value.
    fn call(&mut self, function: &Rc<UserFunction<'ast>>, arguments: Vec<Value<'ast>>) -> Value<'ast> {
        let environment = Environment::with_enclosing(&function.closure);
        for (parameter, argument) in function.declaration.parameters.iter().zip(arguments) {
            environment.define(parameter.identifier(), argument);
        }

        match self.execute_block(&function.declaration.body.statements, environment) {
            Ok(()) => Value::Unit,
            Err(Signal::Return(value)) => value,
        }
    }

    fn literal(&self, token: &Token) -> Value<'ast> {
        match token.kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::IntLiteral => Value::I64(token.int()),
            TokenKind::FloatLiteral => Value::Double(token.float()),
            TokenKind::StringLiteral => Value::Str(Rc::from(token.string())),
            kind => unreachable!("Interpreter: literal token {kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspen_lex::scan_tokens;
    use aspen_par::parse;
    use aspen_sem::type_check;
    use aspen_util::Reporter;

    /// Runs the full pipeline and returns stdout.
    fn run(source: &str) -> String {
        let chars: Vec<char> = source.chars().collect();
        let mut reporter = Reporter::new(&chars);
        let tokens = scan_tokens(&chars, &mut reporter);
        let mut program = parse(tokens, &mut reporter);
        assert!(!reporter.had_error(), "parse failed: {}", reporter.render());

        let natives = NativeRegistry::standard();
        type_check(&mut program, &natives.signatures(), &mut reporter);
        assert!(
            !reporter.had_error(),
            "analysis failed: {}",
            reporter.render()
        );

        let mut out = Vec::new();
        interpret(&program, &natives, &mut out);
        String::from_utf8(out).expect("print output is utf-8")
    }

    #[test]
    fn arithmetic_respects_precedence() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run("print 10 % 4 + 8 / 2;"), "6\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            run("let s string = \"hi\"; print s + \", world\";"),
            "hi, world\n"
        );
    }

    #[test]
    fn while_loop_counts() {
        assert_eq!(
            run("let i i64 = 0; while (i < 3) { print i; i = i + 1; }"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn for_loop_desugars_and_runs() {
        assert_eq!(
            run("for (let i i64 = 0; i < 3; i = i + 1) { print i; }"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn mutual_recursion() {
        let source = "\
fn even(n i64) bool { if (n == 0) { return true; } return odd(n - 1); }
fn odd(n i64) bool { if (n == 0) { return false; } return even(n - 1); }
print even(10);
print odd(10);
";
        assert_eq!(run(source), "true\nfalse\n");
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let source = "\
fn make(x i64) fn() i64 {
    fn inner() i64 { return x; }
    return inner;
}
let f fn() i64 = make(42);
let g fn() i64 = make(7);
print f();
print g();
print f();
";
        assert_eq!(run(source), "42\n7\n42\n");
    }

    #[test]
    fn closures_share_mutable_state() {
        let source = "\
fn counter() fn() i64 {
    let n i64 = 0;
    fn next() i64 { n = n + 1; return n; }
    return next;
}
let next fn() i64 = counter();
print next();
print next();
print next();
";
        assert_eq!(run(source), "1\n2\n3\n");
    }

    #[test]
    fn casts_dispatch_through_the_registry() {
        assert_eq!(run("let n i64 = 3; print double(n) / double(2);"), "1.5\n");
        assert_eq!(run("print i64(2.9);"), "2\n");
        assert_eq!(run("print u64(0) - u64(1);"), format!("{}\n", u64::MAX));
    }

    #[test]
    fn default_initializers_have_zero_values() {
        assert_eq!(
            run("let a i64; let b u64; let c bool; let d string; let e double; \
                 print a; print b; print c; print d; print e;"),
            "0\n0\nfalse\n\n0\n"
        );
    }

    #[test]
    fn if_else_chains() {
        let source = "\
let x i64 = 2;
if (x == 1) { print \"one\"; } else if (x == 2) { print \"two\"; } else { print \"many\"; }
";
        assert_eq!(run(source), "two\n");
    }

    #[test]
    fn assignment_is_an_expression_yielding_the_value() {
        assert_eq!(run("let a i64 = 0; let b i64 = 0; a = b = 5; print a + b;"), "10\n");
    }

    #[test]
    fn blocks_shadow_and_restore() {
        let source = "\
let x i64 = 1;
{
    let x i64 = 2;
    print x;
}
print x;
";
        assert_eq!(run(source), "2\n1\n");
    }

    #[test]
    fn return_unwinds_nested_blocks_and_restores_scope() {
        let source = "\
fn find(limit i64) i64 {
    let i i64 = 0;
    while (true) {
        {
            if (i >= limit) { return i; }
        }
        i = i + 1;
    }
    return 0 - 1;
}
print find(4);
print find(0);
";
        assert_eq!(run(source), "4\n0\n");
    }

    #[test]
    fn void_functions_run_for_effect() {
        let source = "\
fn shout(s string) void { print s + \"!\"; }
shout(\"hey\");
shout(\"ho\");
";
        assert_eq!(run(source), "hey!\nho!\n");
    }

    #[test]
    fn early_return_from_void_function() {
        let source = "\
fn maybe(p bool) void {
    if (p) { return; }
    print \"reached\";
}
maybe(true);
maybe(false);
";
        assert_eq!(run(source), "reached\n");
    }

    #[test]
    fn logical_operators_are_strict_but_correct() {
        assert_eq!(run("print true && false; print true || false;"), "false\ntrue\n");
    }

    #[test]
    fn equality_on_strings_is_deep_and_on_functions_identity() {
        assert_eq!(run("print \"ab\" == \"a\" + \"b\";"), "true\n");
        let source = "\
fn f() i64 { return 1; }
let g fn() i64 = f;
print f == g;
fn h() i64 { return 1; }
print f == h;
";
        assert_eq!(run(source), "true\nfalse\n");
    }

    #[test]
    fn natives_are_callable_from_programs() {
        assert_eq!(run("print itoa(42) + \"!\";"), "42!\n");
        assert_eq!(run("print atoi(\"17\") + 1;"), "18\n");
        assert_eq!(run("print atof(\"1.5\") * 2.0;"), "3\n");
        assert_eq!(run("print ftoa(2.5);"), "2.5\n");
        assert_eq!(run("print clock() >= 0;"), "true\n");
    }

    #[test]
    fn fibonacci_runs_recursively() {
        let source = "\
fn fib(n i64) i64 {
    if (n < 2) { return n; }
    return fib(n - 1) + fib(n - 2);
}
print fib(10);
";
        assert_eq!(run(source), "55\n");
    }

    #[test]
    fn bitwise_operators() {
        assert_eq!(run("print 6 & 3; print 6 | 3; print 6 ^ 3;"), "2\n7\n5\n");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(run("print -3; print !false; print -(1 + 2);"), "-3\ntrue\n-3\n");
    }
}
