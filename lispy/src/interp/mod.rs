//! Tree-walking interpreter
//!
//! Source text is read into [`Value`]s and evaluated against a chain of
//! [`Environment`] frames. Failures are values too: see [`RuntimeError`].

mod builtins;
mod env;
mod error;
mod eval;
mod read;
mod value;

pub use builtins::{register_builtins, ArithOp, OrdOp, Primitive, Scope};
pub use env::{define, root, EnvRef, Environment};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use read::{read_expr, read_forms, read_program, unescape};
pub use value::{escape, Builtin, Closure, Function, Value, ValueKind};

// Evaluation, reading and rendering all recurse once per nesting level.
// Below 128KB of headroom the stack is extended by another 4MB segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Run `f`, first growing the stack if it is nearly exhausted
fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}

/// Default limit on S-expression nesting during evaluation; the parser
/// applies the same limit to bracket nesting
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Interpreter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Deepest S-expression nesting evaluated before giving up
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
