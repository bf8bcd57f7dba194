//! Nested name-to-payload scopes with depth-indexed access.
//!
//! The same structure backs both phases: during analysis the payload is a
//! `Type`, during evaluation a runtime value. Scopes are shared (cloning an
//! `Environment` aliases the same scope), which is what lets closures keep
//! their defining environment alive after the block that created it exits.

use std::cell::RefCell;
use std::rc::Rc;

use aspen_util::FxHashMap;

/// A handle to one scope in a chain. Cheap to clone; clones alias.
pub struct Environment<V> {
    scope: Rc<RefCell<Scope<V>>>,
}

struct Scope<V> {
    enclosing: Option<Environment<V>>,
    values: FxHashMap<String, V>,
}

impl<V> Clone for Environment<V> {
    fn clone(&self) -> Self {
        Self {
            scope: Rc::clone(&self.scope),
        }
    }
}

impl<V> Default for Environment<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Environment<V> {
    /// A fresh global scope.
    pub fn new() -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                enclosing: None,
                values: FxHashMap::default(),
            })),
        }
    }

    /// A fresh scope nested inside `enclosing`.
    pub fn with_enclosing(enclosing: &Environment<V>) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                enclosing: Some(enclosing.clone()),
                values: FxHashMap::default(),
            })),
        }
    }

    pub fn is_global(&self) -> bool {
        self.scope.borrow().enclosing.is_none()
    }

    /// Binds `name` in this scope. Shadowing rules are the analyzer's
    /// business; an existing binding is overwritten.
    pub fn define(&self, name: impl Into<String>, value: V) {
        self.scope.borrow_mut().values.insert(name.into(), value);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.depth_of(name).is_some()
    }

    pub fn is_defined_locally(&self, name: &str) -> bool {
        self.scope.borrow().values.contains_key(name)
    }

    /// Hops from this scope to the innermost scope binding `name`.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        let mut environment = self.clone();
        let mut depth = 0;
        loop {
            if environment.is_defined_locally(name) {
                return Some(depth);
            }
            let enclosing = environment.scope.borrow().enclosing.clone();
            match enclosing {
                Some(parent) => {
                    environment = parent;
                    depth += 1;
                }
                None => return None,
            }
        }
    }

    /// Walks up `depth` parents.
    ///
    /// Panics when the chain is shorter than `depth`; the analyzer
    /// guarantees the depths it hands out are valid.
    pub fn ancestor(&self, depth: usize) -> Environment<V> {
        let mut environment = self.clone();
        for _ in 0..depth {
            let enclosing = environment.scope.borrow().enclosing.clone();
            environment = enclosing
                .unwrap_or_else(|| panic!("Environment::ancestor: bad depth {depth}"));
        }
        environment
    }
}

impl<V: Clone> Environment<V> {
    /// Direct-indexed lookup at a pre-resolved depth.
    pub fn get_at(&self, name: &str, depth: usize) -> V {
        self.ancestor(depth)
            .scope
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("Environment::get_at: '{name}' not defined at depth {depth}"))
    }

    /// Direct-indexed assignment at a pre-resolved depth.
    pub fn assign_at(&self, name: &str, depth: usize, value: V) {
        let ancestor = self.ancestor(depth);
        let mut scope = ancestor.scope.borrow_mut();
        match scope.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => panic!("Environment::assign_at: '{name}' not defined at depth {depth}"),
        }
    }
}
