//! Expression evaluator

use super::builtins;
use super::env::{EnvRef, Environment};
use super::error::{InterpResult, RuntimeError};
use super::read::{read_forms, read_program};
use super::value::{Closure, Function, Value};
use super::{with_stack, Config};
use crate::parser::Parser;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::iter;
use std::path::Path;
use std::rc::Rc;

/// The interpreter
pub struct Interpreter {
    /// Global environment, holding the builtins and every `def`
    global_env: EnvRef,
    /// Parser reused for REPL lines and `load`
    parser: Parser,
    /// Sink for `print` and for errors reported while loading
    out: Box<dyn Write>,
    config: Config,
    /// Current S-expression nesting depth
    depth: usize,
}

impl Interpreter {
    /// Create an interpreter that prints to stdout
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter that prints to `out`
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let mut global = Environment::new();
        builtins::register_builtins(&mut global);
        let config = Config::default();
        Interpreter {
            global_env: global.into_ref(),
            parser: Parser::new().with_max_nesting(config.max_depth),
            out,
            config,
            depth: 0,
        }
    }

    /// Replace the settings; the depth limit also bounds bracket nesting
    /// in source text
    pub fn with_config(mut self, config: Config) -> Self {
        self.parser = Parser::new().with_max_nesting(config.max_depth);
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }

    /// Evaluate a value in `env`
    ///
    /// Symbols are looked up, S-expressions are reduced, everything else
    /// evaluates to itself.
    pub fn eval(&mut self, env: &EnvRef, value: Value) -> Value {
        match value {
            Value::Symbol(name) => env.borrow().get(&name),
            Value::SExpr(items) => self.eval_sexpr(env, items),
            other => other,
        }
    }

    /// Reduce an S-expression with automatic stack growth for deep recursion
    fn eval_sexpr(&mut self, env: &EnvRef, items: Vec<Value>) -> Value {
        if self.depth >= self.config.max_depth {
            tracing::debug!(limit = self.config.max_depth, "recursion limit reached");
            return Value::Error(RuntimeError::recursion_limit(self.config.max_depth));
        }

        self.depth += 1;
        let result = with_stack(|| self.eval_sexpr_inner(env, items));
        self.depth -= 1;
        result
    }

    fn eval_sexpr_inner(&mut self, env: &EnvRef, items: Vec<Value>) -> Value {
        let mut values: Vec<Value> = items.into_iter().map(|v| self.eval(env, v)).collect();

        if let Some(pos) = values.iter().position(Value::is_error) {
            return values.swap_remove(pos);
        }

        match values.len() {
            0 => return Value::sexpr(),
            1 => return values.swap_remove(0),
            _ => {}
        }

        let args = values.split_off(1);
        match values.swap_remove(0) {
            Value::Function(func) => self.apply(env, func, args),
            other => Value::Error(RuntimeError::not_a_function(other.kind())),
        }
    }

    /// Apply a function to evaluated arguments; `env` is the caller's
    pub fn apply(&mut self, env: &EnvRef, func: Function, args: Vec<Value>) -> Value {
        match func {
            Function::Builtin(b) => builtins::call(self, env, b.prim, args),
            Function::Closure(c) => self.apply_closure(env, c, args),
        }
    }

    /// Bind as many formals as there are arguments
    ///
    /// A saturated closure runs its body with the caller's environment as the
    /// parent of its frame; otherwise the partially applied closure is the
    /// result.
    fn apply_closure(&mut self, env: &EnvRef, closure: Closure, args: Vec<Value>) -> Value {
        let Closure { formals, body, env: frame } = closure;
        let total = formals.len();
        let given = args.len();

        let mut formals: VecDeque<String> = formals.into();
        let mut args: VecDeque<Value> = args.into();

        while let Some(arg) = args.pop_front() {
            let Some(formal) = formals.pop_front() else {
                return Value::Error(RuntimeError::too_many_arguments(given, total));
            };

            if formal == "&" {
                if formals.len() != 1 {
                    return Value::Error(RuntimeError::invalid_rest_marker());
                }
                let rest: Vec<Value> = iter::once(arg).chain(args.drain(..)).collect();
                if let Some(name) = formals.pop_front() {
                    frame.borrow_mut().set(&name, Value::QExpr(rest));
                }
                break;
            }

            frame.borrow_mut().set(&formal, arg);
        }

        // Only the variadic part left: bind it to the empty list
        if formals.front().is_some_and(|f| f == "&") {
            if formals.len() != 2 {
                return Value::Error(RuntimeError::invalid_rest_marker());
            }
            formals.pop_front();
            if let Some(name) = formals.pop_front() {
                frame.borrow_mut().set(&name, Value::QExpr(Vec::new()));
            }
        }

        if !formals.is_empty() {
            tracing::trace!(given, remaining = formals.len(), "partial application");
            return Value::Function(Function::Closure(Closure {
                formals: formals.into(),
                body,
                env: frame,
            }));
        }

        tracing::trace!(given, "closure saturated");
        frame.borrow_mut().set_parent(Rc::clone(env));
        self.eval(&frame, Value::SExpr(body))
    }

    /// Read a REPL line as one S-expression and evaluate it globally
    pub fn eval_line(&mut self, source: &str) -> crate::Result<Value> {
        let program = self.parser.parse(source)?;
        let env = Rc::clone(&self.global_env);
        Ok(self.eval(&env, read_program(&program)))
    }

    /// Evaluate every top-level form of a file in `env`
    ///
    /// Forms that evaluate to an error are reported to the output sink and
    /// loading carries on with the next one.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load_file(&mut self, env: &EnvRef, path: &Path) -> Value {
        let program = match self.parser.parse_file(path) {
            Ok((_, program)) => program,
            Err(err) => {
                tracing::debug!(error = %err, "load failed");
                return Value::Error(RuntimeError::load_failure(err.message()));
            }
        };

        let forms = read_forms(&program);
        tracing::debug!(forms = forms.len(), "loading");

        for form in forms {
            let result = self.eval(env, form);
            if result.is_error()
                && let Err(err) = self.write_line(&result.to_string())
            {
                return Value::Error(err);
            }
        }

        Value::sexpr()
    }

    /// Load a file into the global environment
    pub fn load(&mut self, path: &Path) -> Value {
        let env = Rc::clone(&self.global_env);
        self.load_file(&env, path)
    }

    /// Write one line to the output sink
    pub fn write_line(&mut self, line: &str) -> InterpResult<()> {
        writeln!(self.out, "{line}")
            .and_then(|_| self.out.flush())
            .map_err(|e| RuntimeError::io_error(&e.to_string()))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
