//! Runtime values for the interpreter

use super::builtins::Primitive;
use super::env::{EnvRef, Environment};
use super::error::RuntimeError;
use super::with_stack;
use std::fmt;

/// Runtime value
///
/// `Clone` is the language's copy operation and is always deep: list items
/// are cloned recursively and a closure gets its own copy of its frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Evaluation failure, propagated as data
    Error(RuntimeError),
    /// 64-bit signed integer
    Number(i64),
    /// Identifier resolved against an environment
    Symbol(String),
    /// String literal with escapes already decoded
    Str(String),
    /// Expression awaiting evaluation: `( ... )`
    SExpr(Vec<Value>),
    /// Quoted list, never evaluated implicitly: `{ ... }`
    QExpr(Vec<Value>),
    /// Builtin or closure
    Function(Function),
}

/// Tag of a [`Value`], used for type checks and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Error,
    Number,
    Symbol,
    Str,
    SExpr,
    QExpr,
    Function,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Function => "Function",
            ValueKind::Number => "Number",
            ValueKind::Error => "Error",
            ValueKind::Str => "String",
            ValueKind::Symbol => "Symbol",
            ValueKind::SExpr => "S-Expression",
            ValueKind::QExpr => "Q-Expression",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A callable value
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Builtin(Builtin),
    Closure(Closure),
}

/// A primitive together with the name it was registered under
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: String,
    pub prim: Primitive,
}

impl PartialEq for Builtin {
    /// The same primitive under two names is still the same function
    fn eq(&self, other: &Self) -> bool {
        self.prim == other.prim
    }
}

/// User-defined function built by `\`
///
/// `formals` shrinks as arguments are supplied; the arguments bound so far
/// live in `env`, which has no parent until the closure is fully applied.
pub struct Closure {
    pub formals: Vec<String>,
    pub body: Vec<Value>,
    pub env: EnvRef,
}

impl Closure {
    pub fn new(formals: Vec<String>, body: Vec<Value>) -> Self {
        Closure {
            formals,
            body,
            env: Environment::new().into_ref(),
        }
    }
}

impl Clone for Closure {
    fn clone(&self) -> Self {
        let frame = self.env.borrow().clone();
        Closure {
            formals: self.formals.clone(),
            body: self.body.clone(),
            env: frame.into_ref(),
        }
    }
}

impl PartialEq for Closure {
    /// Captured environments are not compared
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.body == other.body
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("formals", &self.formals)
            .field("body", &self.body)
            .field("bound", &self.env.borrow().len())
            .finish()
    }
}

impl Value {
    /// The empty S-expression `()`, the result of side-effecting builtins
    pub fn sexpr() -> Self {
        Value::SExpr(Vec::new())
    }

    pub fn builtin(name: &str, prim: Primitive) -> Self {
        Value::Function(Function::Builtin(Builtin {
            name: name.to_string(),
            prim,
        }))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Error(_) => ValueKind::Error,
            Value::Number(_) => ValueKind::Number,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Str(_) => ValueKind::Str,
            Value::SExpr(_) => ValueKind::SExpr,
            Value::QExpr(_) => ValueKind::QExpr,
            Value::Function(_) => ValueKind::Function,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<RuntimeError> for Value {
    fn from(err: RuntimeError) -> Self {
        Value::Error(err)
    }
}

/// Characters written as a backslash escape inside string literals
pub(crate) const ESCAPES: [(char, char); 11] = [
    ('\x07', 'a'),
    ('\x08', 'b'),
    ('\x0c', 'f'),
    ('\n', 'n'),
    ('\r', 'r'),
    ('\t', 't'),
    ('\x0b', 'v'),
    ('\\', '\\'),
    ('\'', '\''),
    ('"', '"'),
    ('\0', '0'),
];

/// Re-encode a decoded string so it reads back to the same text
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, code)) => {
                out.push('\\');
                out.push(*code);
            }
            None => out.push(c),
        }
    }
    out
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        with_stack(|| write!(f, "{item}"))?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Error(err) => write!(f, "{err}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Str(s) => write!(f, "\"{}\"", escape(s)),
            Value::SExpr(items) => write_items(f, items, '(', ')'),
            Value::QExpr(items) => write_items(f, items, '{', '}'),
            Value::Function(Function::Builtin(b)) => write!(f, "Function: {}", b.name),
            Value::Function(Function::Closure(c)) => {
                write!(f, "(\\ {{{}}} ", c.formals.join(" "))?;
                write_items(f, &c.body, '{', '}')?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::builtins::ArithOp;
    use std::rc::Rc;

    fn num(n: i64) -> Value {
        Value::Number(n)
    }

    fn sym(s: &str) -> Value {
        Value::Symbol(s.to_string())
    }

    #[test]
    fn test_value_display_atoms() {
        assert_eq!(num(-42).to_string(), "-42");
        assert_eq!(sym("head").to_string(), "head");
        assert_eq!(Value::Error(RuntimeError::user("boom")).to_string(), "Error: boom");
    }

    #[test]
    fn test_value_display_lists() {
        let v = Value::SExpr(vec![sym("+"), num(1), Value::QExpr(vec![num(2), num(3)])]);
        assert_eq!(v.to_string(), "(+ 1 {2 3})");
        assert_eq!(Value::sexpr().to_string(), "()");
        assert_eq!(Value::QExpr(vec![]).to_string(), "{}");
    }

    #[test]
    fn test_string_display_reescapes() {
        let v = Value::Str("line\n\"quoted\"\ttab\\".to_string());
        insta::assert_snapshot!(v.to_string(), @r#""line\n\"quoted\"\ttab\\""#);
    }

    #[test]
    fn test_closure_display() {
        let c = Closure::new(
            vec!["x".into(), "y".into()],
            vec![sym("+"), sym("x"), sym("y")],
        );
        let v = Value::Function(Function::Closure(c));
        insta::assert_snapshot!(v.to_string(), @r"(\ {x y} {+ x y})");
    }

    #[test]
    fn test_builtin_display_uses_stored_name() {
        let v = Value::builtin("add", Primitive::Arith(ArithOp::Add));
        assert_eq!(v.to_string(), "Function: add");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(num(1).kind().name(), "Number");
        assert_eq!(Value::Str(String::new()).kind().name(), "String");
        assert_eq!(Value::sexpr().kind().name(), "S-Expression");
        assert_eq!(Value::QExpr(vec![]).kind().name(), "Q-Expression");
        assert_eq!(Value::builtin("+", Primitive::Arith(ArithOp::Add)).kind().name(), "Function");
    }

    #[test]
    fn test_equality_by_tag_and_value() {
        assert_eq!(num(3), num(3));
        assert_ne!(num(3), num(4));
        assert_ne!(num(3), Value::Str("3".into()));
        assert_ne!(sym("x"), Value::Str("x".into()));
        assert_ne!(Value::sexpr(), Value::QExpr(vec![]));
    }

    #[test]
    fn test_list_equality_requires_same_length() {
        let a = Value::QExpr(vec![num(1), num(2)]);
        let b = Value::QExpr(vec![num(1), num(2), num(3)]);
        assert_ne!(a, b);
        assert_eq!(a, Value::QExpr(vec![num(1), num(2)]));
    }

    #[test]
    fn test_builtin_equality_ignores_name() {
        let a = Value::builtin("+", Primitive::Arith(ArithOp::Add));
        let b = Value::builtin("plus", Primitive::Arith(ArithOp::Add));
        let c = Value::builtin("-", Primitive::Arith(ArithOp::Sub));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_closure_equality_ignores_environment() {
        let a = Closure::new(vec!["x".into()], vec![sym("x")]);
        let b = Closure::new(vec!["x".into()], vec![sym("x")]);
        b.env.borrow_mut().set("unrelated", num(99));
        assert_eq!(a, b);
        let c = Closure::new(vec!["y".into()], vec![sym("y")]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_closure_clone_copies_frame() {
        let original = Closure::new(vec!["y".into()], vec![sym("y")]);
        original.env.borrow_mut().set("x", num(1));

        let copy = original.clone();
        copy.env.borrow_mut().set("x", num(2));

        assert!(!Rc::ptr_eq(&original.env, &copy.env));
        assert_eq!(original.env.borrow().get("x"), num(1));
        assert_eq!(copy.env.borrow().get("x"), num(2));
    }

    #[test]
    fn test_escape_round_trip_table() {
        assert_eq!(escape("a\tb"), "a\\tb");
        assert_eq!(escape("it's"), "it\\'s");
        assert_eq!(escape("plain"), "plain");
    }
}
