// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persistent JSON values.
//!
//! [`Value`] is the target structure golden paths are resolved against. Arrays
//! and objects are reference counted, so cloning is cheap and [`Value::set_in`]
//! only copies the nodes along the written path. Every untouched subtree is
//! shared with the original value.

use std::fmt::{self, Display};
use std::sync::Arc;

use ::serde_json::Number;
use indexmap::IndexMap;

use crate::node::PathKey;

mod serde_json;

/// An object, keyed in insertion order.
pub type Map = IndexMap<String, Value>;

/// A JSON value with copy-on-write containers.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value, returned for paths that do not exist.
    Undefined,
    /// JSON `null`.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Map>),
}

impl Value {
    /// Returns `true` if the value is the [`Value::Undefined`] sentinel.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns `true` if the value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// If the value is a boolean, returns the associated bool. Returns `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a number, returns the associated number. Returns `None` otherwise.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is a string, returns the associated str. Returns `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns the associated elements. Returns `None` otherwise.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// If the value is an object, returns the associated map. Returns `None` otherwise.
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same value.
    ///
    /// Arrays and objects are the same only if they share storage, scalars are
    /// compared by value.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                false
            }
            _ => self == other,
        }
    }

    /// Returns the child at `key`.
    ///
    /// Objects are also addressable by index, which looks up the decimal key.
    pub fn get(&self, key: &PathKey) -> Option<&Value> {
        match (self, key) {
            (Value::Object(o), PathKey::Key(k)) => o.get(k),
            (Value::Object(o), PathKey::Index(_)) => o.get(key.as_key().as_ref()),
            (Value::Array(a), PathKey::Index(i)) => a.get(*i),
            _ => None,
        }
    }

    /// Walks `path` and returns the value found, or `None` as soon as a step is missing.
    pub fn get_in(&self, path: &[PathKey]) -> Option<&Value> {
        path.iter().try_fold(self, |value, key| value.get(key))
    }

    /// Returns a new value with `value` written at `path`.
    ///
    /// Missing intermediate nodes are created: an array if the next step is an
    /// index, an object otherwise. An empty path replaces the whole value.
    pub fn set_in(&self, path: &[PathKey], value: Value) -> Value {
        let Some((key, rest)) = path.split_first() else {
            return value;
        };
        let child = match rest.first() {
            None => value,
            Some(next) => match self.get(key) {
                Some(child @ (Value::Array(_) | Value::Object(_))) => child.set_in(rest, value),
                _ => Value::empty_for(next).set_in(rest, value),
            },
        };
        self.assoc(key, child)
    }

    fn empty_for(key: &PathKey) -> Value {
        match key {
            PathKey::Index(_) => Value::Array(Arc::default()),
            PathKey::Key(_) => Value::Object(Arc::default()),
        }
    }

    /// Shallow copy with a single child replaced.
    fn assoc(&self, key: &PathKey, child: Value) -> Value {
        match (self, key) {
            (Value::Array(a), PathKey::Index(i)) => {
                let mut array = Vec::clone(a);
                if *i < array.len() {
                    array[*i] = child;
                } else {
                    array.resize(*i, Value::Null);
                    array.push(child);
                }
                Value::Array(Arc::new(array))
            }
            (Value::Array(_), PathKey::Key(k)) => {
                tracing::debug!(key = %k, "dropping write of a named key into an array");
                self.clone()
            }
            (Value::Object(o), key) => {
                let mut object = Map::clone(o);
                object.insert(key.as_key().into_owned(), child);
                Value::Object(Arc::new(object))
            }
            (_, key) => {
                let mut object = Map::new();
                object.insert(key.as_key().into_owned(), child);
                Value::Object(Arc::new(object))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            return write!(f, "undefined");
        }
        let s = ::serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite numbers become `null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Arc::new(values))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(Arc::new(map))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(Arc::new(iter.into_iter().collect()))
    }
}
