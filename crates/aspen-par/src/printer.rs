//! S-expression rendering of the syntax tree.
//!
//! Each node renders as `(<head> <child>...)`; tokens render to their
//! surface syntax with literals in canonical form. Used by the driver's
//! `--parse` mode and by the parser tests.

use std::fmt::Write;

use crate::ast::{Expr, Program, Stmt};

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    out.push('(');
    for (i, stmt) in program.0.iter().enumerate() {
        write_stmt(&mut out, stmt);
        if i != program.0.len() - 1 {
            out.push(' ');
        }
    }
    out.push(')');
    out
}

pub fn print_stmt(stmt: &Stmt) -> String {
    let mut out = String::new();
    write_stmt(&mut out, stmt);
    out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_stmt(out: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(s) => {
            out.push_str("(expr ");
            write_expr(out, &s.expr);
            out.push(')');
        }
        Stmt::Print(s) => {
            out.push_str("(print ");
            write_expr(out, &s.expr);
            out.push(')');
        }
        Stmt::Let(s) => {
            let _ = write!(out, "(let {} {}", s.name.identifier(), s.ty);
            if let Some(initializer) = &s.initializer {
                out.push(' ');
                write_expr(out, initializer);
            }
            out.push(')');
        }
        Stmt::Block(s) => {
            out.push_str("(block");
            for stmt in &s.statements {
                out.push(' ');
                write_stmt(out, stmt);
            }
            out.push(')');
        }
        Stmt::If(s) => {
            out.push_str("(if ");
            write_expr(out, &s.condition);
            out.push(' ');
            write_stmt(out, &s.then_branch);
            if let Some(else_branch) = &s.else_branch {
                out.push(' ');
                write_stmt(out, else_branch);
            }
            out.push(')');
        }
        Stmt::While(s) => {
            out.push_str("(while ");
            write_expr(out, &s.condition);
            out.push(' ');
            write_stmt(out, &s.body);
            out.push(')');
        }
        Stmt::Function(s) => {
            let _ = write!(
                out,
                "(fn {} (return {})",
                s.name.identifier(),
                s.ty.return_type
            );
            for (parameter, ty) in s.parameters.iter().zip(&s.ty.parameters) {
                let _ = write!(out, " (param {} {ty})", parameter.identifier());
            }
            for stmt in &s.body.statements {
                out.push(' ');
                write_stmt(out, stmt);
            }
            out.push(')');
        }
        Stmt::Return(s) => {
            out.push_str("(return");
            if let Some(value) = &s.value {
                out.push(' ');
                write_expr(out, value);
            }
            out.push(')');
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(e) => {
            let _ = write!(out, "({} ", e.operator);
            write_expr(out, &e.left);
            out.push(' ');
            write_expr(out, &e.right);
            out.push(')');
        }
        Expr::Unary(e) => {
            let _ = write!(out, "({} ", e.operator);
            write_expr(out, &e.operand);
            out.push(')');
        }
        Expr::Literal(e) => {
            let _ = write!(out, "{}", e.value);
        }
        Expr::Grouping(e) => {
            out.push_str("(group ");
            write_expr(out, &e.expr);
            out.push(')');
        }
        Expr::Identifier(e) => {
            let _ = write!(out, "(identifier {})", e.name.identifier());
        }
        Expr::Assignment(e) => {
            let _ = write!(out, "(= (identifier {}) ", e.name.identifier());
            write_expr(out, &e.value);
            out.push(')');
        }
        Expr::Call(e) => {
            out.push_str("(call ");
            write_expr(out, &e.callee);
            for argument in &e.arguments {
                out.push(' ');
                write_expr(out, argument);
            }
            out.push(')');
        }
        Expr::Cast(e) => {
            let _ = write!(out, "(cast {} ", e.to);
            write_expr(out, &e.value);
            out.push(')');
        }
    }
}
