//! Reader: AST to runtime values

use super::error::RuntimeError;
use super::value::ESCAPES;
use super::{with_stack, Value};
use crate::ast::{Expr, Program, Spanned};

/// Read a whole source unit as one S-expression of its top-level forms
///
/// This is how a REPL line is evaluated: `+ 1 2` typed at the prompt is the
/// same as `(+ 1 2)`.
pub fn read_program(program: &Program) -> Value {
    Value::SExpr(read_forms(program))
}

/// Read each top-level form separately, dropping comments
pub fn read_forms(program: &Program) -> Vec<Value> {
    read_nodes(&program.items)
}

/// Convert one node; comments have no value
pub fn read_expr(expr: &Expr) -> Option<Value> {
    let value = match expr {
        Expr::Number(text) => read_number(text),
        Expr::Symbol(name) => Value::Symbol(name.clone()),
        Expr::Str(raw) => Value::Str(unescape(strip_quotes(raw))),
        Expr::Comment(_) => return None,
        Expr::SExpr(items) => Value::SExpr(read_nodes(items)),
        Expr::QExpr(items) => Value::QExpr(read_nodes(items)),
    };
    Some(value)
}

fn read_nodes(nodes: &[Spanned<Expr>]) -> Vec<Value> {
    with_stack(|| nodes.iter().filter_map(|n| read_expr(&n.node)).collect())
}

fn read_number(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Error(RuntimeError::invalid_number()),
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Decode backslash escapes; unknown escapes are kept as written
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(code) => match ESCAPES.iter().find(|(_, esc)| *esc == code) {
                Some((raw, _)) => out.push(*raw),
                None => {
                    out.push('\\');
                    out.push(code);
                }
            },
            None => out.push('\\'),
        }
    }
    out
}
