//! Builtin function library
//!
//! Every builtin checks its whole argument list before doing anything, so a
//! rejected call has no side effects. Checks run in argument order and the
//! first failure becomes the result.

use super::env::{self, EnvRef, Environment};
use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::value::{Closure, Function, Value, ValueKind};
use std::path::Path;

/// Integer folds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Two-number predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdOp {
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
}

/// Where `def`-style builtins bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Root frame (`def`)
    Global,
    /// Current frame (`=`)
    Local,
}

/// Identity of a builtin; two builtin values are equal iff these are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    List,
    Head,
    Tail,
    Eval,
    Join,
    Lambda,
    Arith(ArithOp),
    Order(OrdOp),
    Not,
    Equal,
    NotEqual,
    If,
    Def(Scope),
    Load,
    Error,
    Print,
}

impl Primitive {
    /// Every primitive, in registration order
    pub const ALL: [Primitive; 25] = [
        Primitive::List,
        Primitive::Head,
        Primitive::Tail,
        Primitive::Eval,
        Primitive::Join,
        Primitive::Lambda,
        Primitive::Arith(ArithOp::Add),
        Primitive::Arith(ArithOp::Sub),
        Primitive::Arith(ArithOp::Mul),
        Primitive::Arith(ArithOp::Div),
        Primitive::Order(OrdOp::Gt),
        Primitive::Order(OrdOp::Lt),
        Primitive::Order(OrdOp::Ge),
        Primitive::Order(OrdOp::Le),
        Primitive::Order(OrdOp::And),
        Primitive::Order(OrdOp::Or),
        Primitive::Not,
        Primitive::Equal,
        Primitive::NotEqual,
        Primitive::If,
        Primitive::Def(Scope::Global),
        Primitive::Def(Scope::Local),
        Primitive::Load,
        Primitive::Error,
        Primitive::Print,
    ];

    /// Name bound in a fresh global environment; also used in diagnostics
    pub fn symbol(self) -> &'static str {
        match self {
            Primitive::List => "list",
            Primitive::Head => "head",
            Primitive::Tail => "tail",
            Primitive::Eval => "eval",
            Primitive::Join => "join",
            Primitive::Lambda => "\\",
            Primitive::Arith(ArithOp::Add) => "+",
            Primitive::Arith(ArithOp::Sub) => "-",
            Primitive::Arith(ArithOp::Mul) => "*",
            Primitive::Arith(ArithOp::Div) => "/",
            Primitive::Order(OrdOp::Gt) => ">",
            Primitive::Order(OrdOp::Lt) => "<",
            Primitive::Order(OrdOp::Ge) => ">=",
            Primitive::Order(OrdOp::Le) => "<=",
            Primitive::Order(OrdOp::And) => "&&",
            Primitive::Order(OrdOp::Or) => "||",
            Primitive::Not => "!",
            Primitive::Equal => "==",
            Primitive::NotEqual => "!=",
            Primitive::If => "if",
            Primitive::Def(Scope::Global) => "def",
            Primitive::Def(Scope::Local) => "=",
            Primitive::Load => "load",
            Primitive::Error => "error",
            Primitive::Print => "print",
        }
    }
}

/// Register built-in functions
pub fn register_builtins(env: &mut Environment) {
    for prim in Primitive::ALL {
        env.set(prim.symbol(), Value::builtin(prim.symbol(), prim));
    }
}

/// Run a primitive on already-evaluated arguments
pub(super) fn call(interp: &mut Interpreter, env: &EnvRef, prim: Primitive, args: Vec<Value>) -> Value {
    let result = match prim {
        Primitive::List => Ok(Value::QExpr(args)),
        Primitive::Head => builtin_head(args),
        Primitive::Tail => builtin_tail(args),
        Primitive::Eval => builtin_eval(interp, env, args),
        Primitive::Join => builtin_join(args),
        Primitive::Lambda => builtin_lambda(args),
        Primitive::Arith(op) => builtin_arith(prim.symbol(), op, args),
        Primitive::Order(op) => builtin_ord(prim.symbol(), op, args),
        Primitive::Not => builtin_not(args),
        Primitive::Equal => builtin_cmp(prim.symbol(), args, false),
        Primitive::NotEqual => builtin_cmp(prim.symbol(), args, true),
        Primitive::If => builtin_if(interp, env, args),
        Primitive::Def(scope) => builtin_var(env, prim.symbol(), scope, args),
        Primitive::Load => builtin_load(interp, env, args),
        Primitive::Error => builtin_error(args),
        Primitive::Print => builtin_print(interp, args),
    };
    result.unwrap_or_else(Value::from)
}

// ============================================================================
// Argument checks
// ============================================================================

/// Exactly `N` arguments, handed back by value
fn exactly<const N: usize>(func: &str, args: Vec<Value>) -> InterpResult<[Value; N]> {
    let got = args.len();
    args.try_into()
        .map_err(|_| RuntimeError::arity_mismatch(func, got, N))
}

fn into_number(func: &str, index: usize, value: Value) -> InterpResult<i64> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(RuntimeError::type_mismatch(func, index, other.kind(), ValueKind::Number)),
    }
}

fn into_qexpr(func: &str, index: usize, value: Value) -> InterpResult<Vec<Value>> {
    match value {
        Value::QExpr(items) => Ok(items),
        other => Err(RuntimeError::type_mismatch(func, index, other.kind(), ValueKind::QExpr)),
    }
}

fn into_non_empty_qexpr(func: &str, index: usize, value: Value) -> InterpResult<Vec<Value>> {
    let items = into_qexpr(func, index, value)?;
    if items.is_empty() {
        return Err(RuntimeError::empty_list(func, index));
    }
    Ok(items)
}

fn into_string(func: &str, index: usize, value: Value) -> InterpResult<String> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::type_mismatch(func, index, other.kind(), ValueKind::Str)),
    }
}

// ============================================================================
// List functions
// ============================================================================

fn builtin_head(args: Vec<Value>) -> InterpResult<Value> {
    let [list] = exactly::<1>("head", args)?;
    let mut items = into_non_empty_qexpr("head", 0, list)?;
    items.truncate(1);
    Ok(Value::QExpr(items))
}

fn builtin_tail(args: Vec<Value>) -> InterpResult<Value> {
    let [list] = exactly::<1>("tail", args)?;
    let mut items = into_non_empty_qexpr("tail", 0, list)?;
    items.remove(0);
    Ok(Value::QExpr(items))
}

fn builtin_eval(interp: &mut Interpreter, env: &EnvRef, args: Vec<Value>) -> InterpResult<Value> {
    let [list] = exactly::<1>("eval", args)?;
    let items = into_qexpr("eval", 0, list)?;
    Ok(interp.eval(env, Value::SExpr(items)))
}

/// Concatenate Q-expressions, or strings when the first argument is one
fn builtin_join(args: Vec<Value>) -> InterpResult<Value> {
    let Some(first) = args.first() else {
        return Err(RuntimeError::arity_mismatch("join", 0, 1));
    };

    if first.kind() == ValueKind::Str {
        let parts = args
            .into_iter()
            .enumerate()
            .map(|(i, v)| into_string("join", i, v))
            .collect::<InterpResult<Vec<_>>>()?;
        return Ok(Value::Str(parts.concat()));
    }

    let lists = args
        .into_iter()
        .enumerate()
        .map(|(i, v)| into_qexpr("join", i, v))
        .collect::<InterpResult<Vec<_>>>()?;
    Ok(Value::QExpr(lists.into_iter().flatten().collect()))
}

// ============================================================================
// Functions and variables
// ============================================================================

fn builtin_lambda(args: Vec<Value>) -> InterpResult<Value> {
    let [formals, body] = exactly::<2>("\\", args)?;
    let formals = into_qexpr("\\", 0, formals)?;
    let body = into_qexpr("\\", 1, body)?;

    let formals = formals
        .into_iter()
        .map(|v| match v {
            Value::Symbol(name) => Ok(name),
            other => Err(RuntimeError::lambda_non_symbol(other.kind())),
        })
        .collect::<InterpResult<Vec<_>>>()?;

    Ok(Value::Function(Function::Closure(Closure::new(formals, body))))
}

/// `def` and `=`: `(def {a b} 1 2)`
fn builtin_var(env: &EnvRef, func: &str, scope: Scope, args: Vec<Value>) -> InterpResult<Value> {
    let mut args = args.into_iter();
    let Some(names) = args.next() else {
        return Err(RuntimeError::arity_mismatch(func, 0, 1));
    };

    let names = into_qexpr(func, 0, names)?
        .into_iter()
        .map(|v| match v {
            Value::Symbol(name) => Ok(name),
            other => Err(RuntimeError::define_non_symbol(func, other.kind())),
        })
        .collect::<InterpResult<Vec<_>>>()?;

    let values: Vec<Value> = args.collect();
    if names.len() != values.len() {
        return Err(RuntimeError::define_count_mismatch(func, names.len(), values.len()));
    }

    for (name, value) in names.iter().zip(values) {
        match scope {
            Scope::Global => env::define(env, name, value),
            Scope::Local => env.borrow_mut().set(name, value),
        }
    }

    Ok(Value::sexpr())
}

// ============================================================================
// Arithmetic and comparison
// ============================================================================

/// Left fold over the arguments; a lone `-` negates
fn builtin_arith(func: &str, op: ArithOp, args: Vec<Value>) -> InterpResult<Value> {
    let numbers = args
        .into_iter()
        .enumerate()
        .map(|(i, v)| into_number(func, i, v))
        .collect::<InterpResult<Vec<_>>>()?;

    let Some((&first, rest)) = numbers.split_first() else {
        return Err(RuntimeError::arity_mismatch(func, 0, 1));
    };

    if op == ArithOp::Sub && rest.is_empty() {
        return Ok(Value::Number(first.wrapping_neg()));
    }

    let mut acc = first;
    for &y in rest {
        acc = match op {
            ArithOp::Add => acc.wrapping_add(y),
            ArithOp::Sub => acc.wrapping_sub(y),
            ArithOp::Mul => acc.wrapping_mul(y),
            ArithOp::Div => {
                if y == 0 {
                    return Err(RuntimeError::division_by_zero());
                }
                acc.wrapping_div(y)
            }
        };
    }

    Ok(Value::Number(acc))
}

fn builtin_ord(func: &str, op: OrdOp, args: Vec<Value>) -> InterpResult<Value> {
    let [a, b] = exactly::<2>(func, args)?;
    let a = into_number(func, 0, a)?;
    let b = into_number(func, 1, b)?;

    let r = match op {
        OrdOp::Gt => a > b,
        OrdOp::Lt => a < b,
        OrdOp::Ge => a >= b,
        OrdOp::Le => a <= b,
        OrdOp::And => a != 0 && b != 0,
        OrdOp::Or => a != 0 || b != 0,
    };
    Ok(Value::Number(i64::from(r)))
}

fn builtin_not(args: Vec<Value>) -> InterpResult<Value> {
    let [x] = exactly::<1>("!", args)?;
    let x = into_number("!", 0, x)?;
    Ok(Value::Number(i64::from(x == 0)))
}

/// Structural (in)equality of any two values
fn builtin_cmp(func: &str, args: Vec<Value>, negate: bool) -> InterpResult<Value> {
    let [a, b] = exactly::<2>(func, args)?;
    Ok(Value::Number(i64::from((a == b) != negate)))
}

// ============================================================================
// Control flow
// ============================================================================

/// Only the chosen branch is ever evaluated
fn builtin_if(interp: &mut Interpreter, env: &EnvRef, args: Vec<Value>) -> InterpResult<Value> {
    let [cond, then_branch, else_branch] = exactly::<3>("if", args)?;
    let cond = into_number("if", 0, cond)?;
    let then_branch = into_qexpr("if", 1, then_branch)?;
    let else_branch = into_qexpr("if", 2, else_branch)?;

    let chosen = if cond != 0 { then_branch } else { else_branch };
    Ok(interp.eval(env, Value::SExpr(chosen)))
}

// ============================================================================
// Strings and I/O
// ============================================================================

fn builtin_load(interp: &mut Interpreter, env: &EnvRef, args: Vec<Value>) -> InterpResult<Value> {
    let [path] = exactly::<1>("load", args)?;
    let path = into_string("load", 0, path)?;
    Ok(interp.load_file(env, Path::new(&path)))
}

fn builtin_error(args: Vec<Value>) -> InterpResult<Value> {
    let [message] = exactly::<1>("error", args)?;
    let message = into_string("error", 0, message)?;
    Ok(Value::Error(RuntimeError::user(&message)))
}

/// Each argument followed by a space, then a newline
fn builtin_print(interp: &mut Interpreter, args: Vec<Value>) -> InterpResult<Value> {
    let mut line = String::new();
    for arg in &args {
        line.push_str(&arg.to_string());
        line.push(' ');
    }
    interp.write_line(&line)?;
    Ok(Value::sexpr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;

    fn num(n: i64) -> Value {
        Value::Number(n)
    }

    fn qexpr(items: Vec<Value>) -> Value {
        Value::QExpr(items)
    }

    fn error_kind(v: &Value) -> Option<ErrorKind> {
        match v {
            Value::Error(err) => Some(err.kind),
            _ => None,
        }
    }

    fn call_pure(prim: Primitive, args: Vec<Value>) -> Value {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        let env = interp.global_env().clone();
        call(&mut interp, &env, prim, args)
    }

    #[test]
    fn test_symbols_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for prim in Primitive::ALL {
            assert!(seen.insert(prim.symbol()), "duplicate {}", prim.symbol());
        }
    }

    #[test]
    fn test_register_builtins_binds_every_primitive() {
        let mut env = Environment::new();
        register_builtins(&mut env);
        assert_eq!(env.len(), Primitive::ALL.len());
        assert_eq!(env.get("\\"), Value::builtin("\\", Primitive::Lambda));
    }

    #[test]
    fn test_arith_folds_left() {
        let add = Primitive::Arith(ArithOp::Add);
        let sub = Primitive::Arith(ArithOp::Sub);
        let div = Primitive::Arith(ArithOp::Div);
        assert_eq!(call_pure(add, vec![num(1), num(2), num(3)]), num(6));
        assert_eq!(call_pure(sub, vec![num(10), num(3), num(2)]), num(5));
        assert_eq!(call_pure(div, vec![num(100), num(5), num(2)]), num(10));
    }

    #[test]
    fn test_unary_minus_negates() {
        assert_eq!(call_pure(Primitive::Arith(ArithOp::Sub), vec![num(4)]), num(-4));
        assert_eq!(call_pure(Primitive::Arith(ArithOp::Add), vec![num(4)]), num(4));
    }

    #[test]
    fn test_arith_wraps_on_overflow() {
        let add = Primitive::Arith(ArithOp::Add);
        let div = Primitive::Arith(ArithOp::Div);
        assert_eq!(call_pure(add, vec![num(i64::MAX), num(1)]), num(i64::MIN));
        assert_eq!(call_pure(div, vec![num(i64::MIN), num(-1)]), num(i64::MIN));
    }

    #[test]
    fn test_division_by_zero() {
        let div = Primitive::Arith(ArithOp::Div);
        let result = call_pure(div, vec![num(7), num(0), num(1)]);
        assert_eq!(error_kind(&result), Some(ErrorKind::DivisionByZero));
    }

    #[test]
    fn test_arith_rejects_non_numbers_before_folding() {
        let div = Primitive::Arith(ArithOp::Div);
        let result = call_pure(div, vec![num(1), num(0), qexpr(vec![])]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.message.contains("argument 2"));
    }

    #[test]
    fn test_arith_without_arguments() {
        let result = call_pure(Primitive::Arith(ArithOp::Mul), vec![]);
        assert_eq!(error_kind(&result), Some(ErrorKind::ArityMismatch));
    }

    #[test]
    fn test_ordering_and_logic() {
        let gt = Primitive::Order(OrdOp::Gt);
        let le = Primitive::Order(OrdOp::Le);
        let and = Primitive::Order(OrdOp::And);
        let or = Primitive::Order(OrdOp::Or);
        assert_eq!(call_pure(gt, vec![num(3), num(2)]), num(1));
        assert_eq!(call_pure(le, vec![num(3), num(2)]), num(0));
        assert_eq!(call_pure(and, vec![num(5), num(0)]), num(0));
        assert_eq!(call_pure(or, vec![num(0), num(-3)]), num(1));
        assert_eq!(call_pure(Primitive::Not, vec![num(0)]), num(1));
        assert_eq!(call_pure(Primitive::Not, vec![num(9)]), num(0));
    }

    #[test]
    fn test_ordering_arity() {
        let lt = Primitive::Order(OrdOp::Lt);
        let Value::Error(err) = call_pure(lt, vec![num(1)]) else { panic!("expected error") };
        assert_eq!(
            err.message,
            "Function '<' passed incorrect number of arguments. Got 1, Expected 2."
        );
    }

    #[test]
    fn test_equality_any_types() {
        assert_eq!(call_pure(Primitive::Equal, vec![qexpr(vec![num(1)]), qexpr(vec![num(1)])]), num(1));
        assert_eq!(call_pure(Primitive::Equal, vec![num(1), Value::Str("1".into())]), num(0));
        assert_eq!(call_pure(Primitive::NotEqual, vec![num(1), num(2)]), num(1));
    }

    #[test]
    fn test_head_and_tail() {
        let list = qexpr(vec![num(1), num(2), num(3)]);
        assert_eq!(call_pure(Primitive::Head, vec![list.clone()]), qexpr(vec![num(1)]));
        assert_eq!(call_pure(Primitive::Tail, vec![list]), qexpr(vec![num(2), num(3)]));
    }

    #[test]
    fn test_head_of_empty_list() {
        let Value::Error(err) = call_pure(Primitive::Head, vec![qexpr(vec![])]) else {
            panic!("expected error")
        };
        assert_eq!(err.kind, ErrorKind::EmptyListArgument);
        assert_eq!(err.message, "Function 'head' passed {} for argument 0.");
    }

    #[test]
    fn test_tail_type_check() {
        let result = call_pure(Primitive::Tail, vec![num(1)]);
        assert_eq!(error_kind(&result), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_list_relabels_arguments() {
        assert_eq!(call_pure(Primitive::List, vec![num(1), num(2)]), qexpr(vec![num(1), num(2)]));
        assert_eq!(call_pure(Primitive::List, vec![]), qexpr(vec![]));
    }

    #[test]
    fn test_join_lists() {
        let result = call_pure(
            Primitive::Join,
            vec![qexpr(vec![num(1)]), qexpr(vec![]), qexpr(vec![num(2), num(3)])],
        );
        assert_eq!(result, qexpr(vec![num(1), num(2), num(3)]));
    }

    #[test]
    fn test_join_strings() {
        let result = call_pure(
            Primitive::Join,
            vec![Value::Str("foo".into()), Value::Str("bar".into())],
        );
        assert_eq!(result, Value::Str("foobar".into()));
    }

    #[test]
    fn test_join_mixed_kinds() {
        let result = call_pure(Primitive::Join, vec![qexpr(vec![]), Value::Str("x".into())]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(
            err.message,
            "Function 'join' passed incorrect type for argument 1. Got String, Expected Q-Expression."
        );

        let result = call_pure(Primitive::Join, vec![Value::Str("x".into()), qexpr(vec![])]);
        assert_eq!(error_kind(&result), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_join_needs_arguments() {
        let result = call_pure(Primitive::Join, vec![]);
        assert_eq!(error_kind(&result), Some(ErrorKind::ArityMismatch));
        let result = call_pure(Primitive::Join, vec![num(1)]);
        assert_eq!(error_kind(&result), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_lambda_requires_symbols() {
        let result = call_pure(
            Primitive::Lambda,
            vec![qexpr(vec![num(1)]), qexpr(vec![])],
        );
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(err.message, "Cannot define non-symbol. Got Number, Expected Symbol.");
    }

    #[test]
    fn test_lambda_builds_parentless_closure() {
        let result = call_pure(
            Primitive::Lambda,
            vec![
                qexpr(vec![Value::Symbol("x".into())]),
                qexpr(vec![Value::Symbol("x".into())]),
            ],
        );
        let Value::Function(Function::Closure(c)) = result else { panic!("expected closure") };
        assert_eq!(c.formals, vec!["x".to_string()]);
        assert!(c.env.borrow().is_empty());
        assert!(c.env.borrow().parent().is_none());
    }

    #[test]
    fn test_def_count_mismatch() {
        let result = call_pure(
            Primitive::Def(Scope::Global),
            vec![qexpr(vec![Value::Symbol("a".into()), Value::Symbol("b".into())]), num(1)],
        );
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(
            err.message,
            "Function 'def' passed too many arguments for symbols. Got 2, Expected 1."
        );
    }

    #[test]
    fn test_def_rejects_non_symbol_names() {
        let result = call_pure(Primitive::Def(Scope::Local), vec![qexpr(vec![num(1)]), num(1)]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(
            err.message,
            "Function '=' cannot define non-symbol. Got Number, expected Symbol."
        );
    }

    #[test]
    fn test_if_validates_before_evaluating() {
        let result = call_pure(Primitive::If, vec![num(1), qexpr(vec![num(1)]), num(2)]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert!(err.message.contains("argument 2"));
    }

    #[test]
    fn test_error_builds_user_error() {
        let result = call_pure(Primitive::Error, vec![Value::Str("bad thing".into())]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(err.kind, ErrorKind::User);
        assert_eq!(err.message, "bad thing");
    }

    #[test]
    fn test_error_requires_string() {
        let result = call_pure(Primitive::Error, vec![num(1)]);
        assert_eq!(error_kind(&result), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_load_missing_file() {
        let result = call_pure(Primitive::Load, vec![Value::Str("/no/such/file.lspy".into())]);
        let Value::Error(err) = result else { panic!("expected error") };
        assert_eq!(err.kind, ErrorKind::LoadFailure);
        assert!(err.message.starts_with("Could not load Library"));
    }
}
