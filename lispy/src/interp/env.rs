//! Environment for variable bindings

use super::error::RuntimeError;
use super::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of bindings plus the link to its lexical parent
///
/// `Clone` copies the bindings deeply and keeps pointing at the same parent.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Value>,
    /// Parent environment for lexical scoping
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create an empty frame with no parent
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Look up a symbol, walking outward through the parents
    ///
    /// Returns a copy of the bound value, or an unbound-symbol error value.
    pub fn get(&self, name: &str) -> Value {
        if let Some(value) = self.bindings.get(name) {
            value.clone()
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            Value::Error(RuntimeError::unbound_symbol(name))
        }
    }

    /// Bind `name` in this frame, replacing any existing binding here
    pub fn set(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn parent(&self) -> Option<&EnvRef> {
        self.parent.as_ref()
    }

    /// Attach the frame to its lexical parent
    pub fn set_parent(&mut self, parent: EnvRef) {
        self.parent = Some(parent);
    }

    /// Number of bindings in this frame
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Outermost frame of the chain `env` belongs to
pub fn root(env: &EnvRef) -> EnvRef {
    let mut current = Rc::clone(env);
    loop {
        let parent = current.borrow().parent().cloned();
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Bind `name` in the outermost frame, however deep `env` is
pub fn define(env: &EnvRef, name: &str, value: Value) {
    root(env).borrow_mut().set(name, value);
}
