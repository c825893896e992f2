use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::values::Value;

/// Runtime environment: a chain of scopes, innermost first. Cloning shares
/// the underlying slot map, so a closure that captured a scope observes
/// slots filled in after capture — recursive `let` relies on exactly that.
#[derive(Clone)]
pub(crate) struct Env {
    parent: Option<Arc<Env>>,
    slots: Arc<Mutex<HashMap<String, Value>>>,
}

impl Env {
    /// The outermost scope, holding the builtins.
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A new empty scope on top of this one. Bindings added to the child
    /// are invisible to holders of `self`.
    pub(crate) fn child(&self) -> Self {
        Self {
            parent: Some(Arc::new(self.clone())),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        if let Ok(slots) = self.slots.lock() {
            if let Some(value) = slots.get(name) {
                return Some(value.clone());
            }
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub(crate) fn set(&self, name: String, value: Value) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(name, value);
        }
    }
}
