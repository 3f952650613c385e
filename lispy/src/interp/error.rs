//! Runtime errors for the interpreter
//!
//! A [`RuntimeError`] is never thrown: it travels inside
//! [`Value::Error`](super::Value::Error) like any other datum, and an
//! S-expression containing one evaluates to the first it finds.

use super::value::ValueKind;
use std::fmt;

/// Runtime error carried by an error value
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Symbol not bound anywhere in the environment chain
    UnboundSymbol,
    /// Builtin argument of the wrong type
    TypeMismatch,
    /// Wrong number of arguments to a builtin or closure
    ArityMismatch,
    /// `{}` where a non-empty list is required
    EmptyListArgument,
    /// S-expression whose head is not a function
    NotAFunction,
    /// Division by zero
    DivisionByZero,
    /// Misplaced `&` in a lambda's formals
    InvalidLambdaFormat,
    /// Integer literal outside the 64-bit range
    InvalidNumericLiteral,
    /// `load` could not read or parse its file
    LoadFailure,
    /// Evaluation nested deeper than the configured limit
    RecursionLimit,
    /// Writing to the output sink failed
    Io,
    /// Raised by the `error` builtin
    User,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn unbound_symbol(name: &str) -> Self {
        Self::new(ErrorKind::UnboundSymbol, format!("Unbound Symbol: {name}"))
    }

    /// `index` is 0-based, as in every builtin diagnostic
    pub fn type_mismatch(func: &str, index: usize, got: ValueKind, expected: ValueKind) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!(
                "Function '{func}' passed incorrect type for argument {index}. \
                 Got {got}, Expected {expected}."
            ),
        )
    }

    pub fn arity_mismatch(func: &str, got: usize, expected: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "Function '{func}' passed incorrect number of arguments. \
                 Got {got}, Expected {expected}."
            ),
        )
    }

    pub fn empty_list(func: &str, index: usize) -> Self {
        Self::new(
            ErrorKind::EmptyListArgument,
            format!("Function '{func}' passed {{}} for argument {index}."),
        )
    }

    pub fn not_a_function(got: ValueKind) -> Self {
        Self::new(
            ErrorKind::NotAFunction,
            format!(
                "S-Expression starts with incorrect type. Got {got}, expected {}.",
                ValueKind::Function
            ),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero!".to_string())
    }

    /// Non-symbol in the formals handed to `\`
    pub fn lambda_non_symbol(got: ValueKind) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Cannot define non-symbol. Got {got}, Expected {}.", ValueKind::Symbol),
        )
    }

    /// Non-symbol in the name list handed to `def` or `=`
    pub fn define_non_symbol(func: &str, got: ValueKind) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!(
                "Function '{func}' cannot define non-symbol. Got {got}, expected {}.",
                ValueKind::Symbol
            ),
        )
    }

    pub fn define_count_mismatch(func: &str, symbols: usize, values: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "Function '{func}' passed too many arguments for symbols. \
                 Got {symbols}, Expected {values}."
            ),
        )
    }

    pub fn too_many_arguments(given: usize, total: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("Function passed too many arguments. Got {given}, expected {total}."),
        )
    }

    pub fn invalid_rest_marker() -> Self {
        Self::new(
            ErrorKind::InvalidLambdaFormat,
            "Function format invalid. Symbol '&' not followed by single symbol.".to_string(),
        )
    }

    pub fn invalid_number() -> Self {
        Self::new(ErrorKind::InvalidNumericLiteral, "invalid number".to_string())
    }

    pub fn load_failure(reason: &str) -> Self {
        Self::new(ErrorKind::LoadFailure, format!("Could not load Library {reason}"))
    }

    pub fn recursion_limit(limit: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimit,
            format!("Recursion limit exceeded: evaluation nested deeper than {limit}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {msg}"))
    }

    pub fn user(message: &str) -> Self {
        Self::new(ErrorKind::User, message.to_string())
    }
}

impl PartialEq for RuntimeError {
    /// Errors are equal when their messages are
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for builtin validation; flattened into a value at dispatch
pub type InterpResult<T> = Result<T, RuntimeError>;
