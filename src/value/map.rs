use std::{slice::Iter, vec::IntoIter};

use codemap::Span;

use crate::common::{Brackets, ListSeparator};
use crate::error::SassResult;
use crate::value::Value;

/// An insertion-ordered Sass map; equality is by deep value equality, not by
/// reference, so lookups walk the list rather than hashing (grounded on the
/// teacher's `value/map.rs`, generalized from `Value` tuples keyed by `Expr`
/// to our runtime `Value`).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SassMap(Vec<(Value, Value)>);

impl SassMap {
    pub const fn new() -> SassMap {
        SassMap(Vec::new())
    }

    pub fn get(&self, key: &Value, span: Span) -> SassResult<Option<Value>> {
        for (k, v) in &self.0 {
            if k.equals(key, span)? {
                return Ok(Some(v.clone()));
            }
        }
        Ok(None)
    }

    pub fn merge(&mut self, other: SassMap) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> Iter<(Value, Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.iter().map(|(k, ..)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.iter().map(|(.., v)| v.clone()).collect()
    }

    pub fn as_list(&self) -> Vec<Value> {
        self.0
            .iter()
            .map(|(k, v)| {
                Value::List(
                    vec![k.clone(), v.clone()],
                    ListSeparator::Space,
                    Brackets::None,
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the key already existed (and was overwritten).
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        for (k, v) in &mut self.0 {
            if *k == key {
                *v = value;
                return true;
            }
        }
        self.0.push((key, value));
        false
    }
}

impl Default for SassMap {
    fn default() -> Self {
        SassMap::new()
    }
}

impl IntoIterator for SassMap {
    type Item = (Value, Value);
    type IntoIter = IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
