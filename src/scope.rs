use std::collections::HashMap;
use std::rc::Rc;
use std::cell::RefCell;

use codemap::Spanned;

use crate::ast::{FunctionStmt, MixinStmt};
use crate::error::{SassError, SassResult};
use crate::value::Value;

/// Normalizes a variable/mixin/function name so that `-` and `_` are
/// interchangeable (spec §3, §4.3).
pub(crate) fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

#[derive(Debug, Default)]
struct ScopeInner {
    vars: HashMap<String, Spanned<Value>>,
    mixins: HashMap<String, Rc<MixinStmt>>,
    functions: HashMap<String, Rc<FunctionStmt>>,
}

/// A lexical environment with parent chaining (spec §4.3). Variables,
/// mixins, and functions live in disjoint namespaces. Scopes are cheap to
/// clone (`Rc`-backed) the way the teacher's `Scope` is `Clone`; child
/// scopes hold a parent pointer rather than copying the whole chain.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    inner: Rc<RefCell<ScopeInner>>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeInner::default())),
            parent: None,
        }
    }

    pub fn child_of(parent: &Scope) -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeInner::default())),
            parent: Some(Box::new(parent.clone())),
        }
    }

    pub fn lookup_var(&self, name: &str) -> SassResult<Spanned<Value>> {
        let key = normalize(name);
        if let Some(v) = self.inner.borrow().vars.get(&key) {
            return Ok(v.clone());
        }
        match &self.parent {
            Some(p) => p.lookup_var(name),
            None => Err(SassError::name(
                format!("Undefined variable: \"${}\".", name),
                crate::common::fallback_span(),
            )),
        }
    }

    pub fn lookup_mixin(&self, name: &str) -> SassResult<Rc<MixinStmt>> {
        let key = normalize(name);
        if let Some(m) = self.inner.borrow().mixins.get(&key) {
            return Ok(Rc::clone(m));
        }
        match &self.parent {
            Some(p) => p.lookup_mixin(name),
            None => Err(SassError::name(
                format!("Undefined mixin: \"{}\".", name),
                crate::common::fallback_span(),
            )),
        }
    }

    pub fn lookup_function(&self, name: &str) -> Option<Rc<FunctionStmt>> {
        let key = normalize(name);
        if let Some(f) = self.inner.borrow().functions.get(&key) {
            return Some(Rc::clone(f));
        }
        self.parent.as_ref().and_then(|p| p.lookup_function(name))
    }

    pub fn insert_var(&self, name: &str, value: Spanned<Value>) {
        self.inner
            .borrow_mut()
            .vars
            .insert(normalize(name), value);
    }

    pub fn insert_mixin(&self, name: &str, mixin: MixinStmt) {
        self.inner
            .borrow_mut()
            .mixins
            .insert(normalize(name), Rc::new(mixin));
    }

    pub fn insert_function(&self, name: &str, func: FunctionStmt) {
        self.inner
            .borrow_mut()
            .functions
            .insert(normalize(name), Rc::new(func));
    }

    /// Walks to the outermost ancestor, used for `!global` assignment
    /// (spec §3 "global assignment writes only at the root").
    pub fn global(&self) -> &Scope {
        match &self.parent {
            Some(p) => p.global(),
            None => self,
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup_var(name).is_ok()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}
