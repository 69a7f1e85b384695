//! Lexically scoped environments.
//!
//! A [Scope] is a cheaply-clonable handle onto a reference-counted,
//! interior-mutable binding map with an optional parent. Function values
//! capture their defining [Scope] by cloning the handle — so writes made
//! later through any clone (including by a sibling closure) are visible
//! through every other clone that shares the same underlying map. This is
//! the reference-counted-scope strategy, chosen over an arena of integer
//! handles or a host GC since the crate carries no garbage collector of
//! its own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

struct ScopeData {
    bindings: HashMap<String, Value>,
    parent: Option<Scope>,
}

/// A chained environment. Cloning a [Scope] clones the handle, not the
/// bindings — all clones observe the same underlying map.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    /// Creates a new scope with no parent (the global scope).
    pub fn new() -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    /// Creates a new child scope whose lookups fall back to `self`.
    pub fn spawn(&self) -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Binds `name` in this scope's local frame, shadowing any binding of
    /// the same name in an outer frame.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Walks the scope chain outward, returning the first binding found.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let data = self.0.borrow();
        if let Some(value) = data.bindings.get(name) {
            return Some(value.clone());
        }
        data.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// Walks the scope chain outward, replacing the binding in the first
    /// frame where `name` already exists. Returns `false` if `name` is
    /// unbound anywhere in the chain (the caller turns that into an
    /// "is not defined" error).
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut data = self.0.borrow_mut();
        if data.bindings.contains_key(name) {
            data.bindings.insert(name.to_string(), value);
            return true;
        }
        match &data.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({} local bindings)", self.0.borrow().bindings.len())
    }
}

/// Closures compare equal only when they share the exact same scope
/// instance — value equality of the bindings inside isn't meaningful here,
/// and walking it would risk looping through reference cycles.
impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_walks_up_the_chain() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let child = global.spawn();
        assert_eq!(Some(Value::Int(1)), child.lookup("x"));
    }

    #[test]
    fn define_in_child_shadows_parent() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let child = global.spawn();
        child.define("x", Value::Int(2));
        assert_eq!(Some(Value::Int(2)), child.lookup("x"));
        assert_eq!(Some(Value::Int(1)), global.lookup("x"));
    }

    #[test]
    fn assign_writes_through_to_the_defining_frame() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let child = global.spawn();
        assert!(child.assign("x", Value::Int(99)));
        assert_eq!(Some(Value::Int(99)), global.lookup("x"));
    }

    #[test]
    fn assign_to_unbound_name_fails() {
        let global = Scope::new();
        assert!(!global.assign("ghost", Value::Int(1)));
    }

    #[test]
    fn closures_sharing_a_scope_observe_each_others_writes() {
        let global = Scope::new();
        global.define("c", Value::Int(0));
        let closure_scope = global.clone();
        closure_scope.assign("c", Value::Int(1));
        assert_eq!(Some(Value::Int(1)), global.lookup("c"));
    }
}
