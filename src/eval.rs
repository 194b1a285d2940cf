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

use std::fmt;

use serde_json::Number;

use crate::{json::Value, node::*, parser::Error as ParseError};

pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by [`get`](crate::get) and [`update`](crate::update).
///
/// A path that does not exist is not an error.
#[non_exhaustive]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("malformed query {query:?}: {source}")]
    MalformedQuery { query: Box<str>, source: ParseError },
    #[error("cannot apply {value} to malformed query {query:?}: {source}")]
    MalformedUpdate {
        query: Box<str>,
        value: Box<str>,
        source: ParseError,
    },
    #[error("query {query:?} expands more than {limit} nested greedy segments")]
    TooDeep { query: Box<str>, limit: usize },
}

/// The outcome of resolving a query against a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A query without greedy segments resolved to one location.
    Single(Path),
    /// A greedy query resolved to these locations, in scan order.
    Multiple(Vec<Path>),
    /// A condition group had no match, or was applied to something that is not an array.
    NotFound {
        /// The path resolved before the miss.
        partial: Path,
        /// Whether the query is greedy.
        greedy: bool,
    },
}

impl Resolution {
    /// Returns all resolved paths. Empty if not found.
    pub fn into_paths(self) -> Vec<Path> {
        match self {
            Resolution::Single(path) => vec![path],
            Resolution::Multiple(paths) => paths,
            Resolution::NotFound { .. } => vec![],
        }
    }
}

/// The new value for an [`update`](crate::update).
pub enum Update<'f> {
    /// Write this value at every resolved path.
    Replace(Value),
    /// Compute the new value from the current one at each resolved path.
    ///
    /// The current value is [`Value::Undefined`] where the path does not exist.
    Apply(Box<dyn FnMut(&Value) -> Value + 'f>),
}

impl<'f> Update<'f> {
    /// Creates an updater from a closure.
    pub fn with(f: impl FnMut(&Value) -> Value + 'f) -> Self {
        Update::Apply(Box::new(f))
    }

    fn new_value(&mut self, current: &Value) -> Value {
        match self {
            Update::Replace(value) => value.clone(),
            Update::Apply(f) => f(current),
        }
    }
}

impl fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

impl fmt::Display for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => write!(f, "{value}"),
            Update::Apply(_) => write!(f, "<function>"),
        }
    }
}

impl From<Value> for Update<'_> {
    fn from(value: Value) -> Self {
        Update::Replace(value)
    }
}

impl From<serde_json::Value> for Update<'_> {
    fn from(value: serde_json::Value) -> Self {
        Update::Replace(value.into())
    }
}

impl GoldenPath {
    /// Resolves the query against `root` into concrete paths.
    ///
    /// Conditions and wildcards read `root` as it is now; nothing is written.
    pub fn resolve(&self, root: &Value) -> Result<Resolution> {
        Resolver {
            query: self,
            root,
            greedy: self.is_greedy(),
        }
        .resolve(&self.segments, Vec::new(), 0)
    }

    /// Returns the value at the query.
    ///
    /// Non-greedy queries return the value, or [`Value::Undefined`] if it does
    /// not exist. Greedy queries return an array of every selected value, which
    /// is empty if nothing matched.
    pub fn get(&self, root: &Value) -> Result<Value> {
        match self.resolve(root)? {
            Resolution::Single(path) => Ok(value_at(root, &path)),
            Resolution::Multiple(paths) => {
                Ok(paths.iter().map(|path| value_at(root, path)).collect())
            }
            Resolution::NotFound { greedy: true, .. } => Ok(Value::from(Vec::new())),
            Resolution::NotFound { greedy: false, .. } => Ok(Value::Undefined),
        }
    }

    /// Returns a new value with every resolved path written.
    ///
    /// `root` is returned unchanged if the query does not resolve. Updaters see
    /// the values of the original `root`, so each path is updated independently.
    /// Writes that would store the value already present are skipped.
    pub fn update<'f>(&self, update: impl Into<Update<'f>>, root: &Value) -> Result<Value> {
        let mut update = update.into();
        let paths = match self.resolve(root)? {
            Resolution::NotFound { partial, .. } => {
                tracing::debug!(query = %self, ?partial, "nothing to update");
                return Ok(root.clone());
            }
            resolution => resolution.into_paths(),
        };
        let mut result = root.clone();
        for path in &paths {
            let current = value_at(root, path);
            let new = update.new_value(&current);
            if new.is_identical(&current) {
                tracing::trace!(?path, "skipping write of identical value");
                continue;
            }
            result = result.set_in(path, new);
        }
        Ok(result)
    }
}

fn value_at(root: &Value, path: &[PathKey]) -> Value {
    root.get_in(path).cloned().unwrap_or(Value::Undefined)
}

/// Resolution context.
#[derive(Debug, Clone, Copy)]
struct Resolver<'a> {
    /// The query being resolved.
    query: &'a GoldenPath,
    /// The value conditions are evaluated against.
    root: &'a Value,
    /// Whether the query is greedy, reported with misses.
    greedy: bool,
}

impl<'a> Resolver<'a> {
    /// Resolves `segments` starting from the already resolved `path`.
    fn resolve(&self, segments: &[Segment], mut path: Path, depth: usize) -> Result<Resolution> {
        for (i, segment) in segments.iter().enumerate() {
            let conditions: &[Condition] = match segment {
                Segment::Key(key) => {
                    path.push(key.clone());
                    continue;
                }
                Segment::Wildcard => &[],
                Segment::Filter { conditions, .. } => conditions,
            };
            let Some(array) = self.root.get_in(&path).and_then(Value::as_array) else {
                tracing::debug!(query = %self.query, ?path, "conditions applied to a non-array");
                return Ok(self.not_found(path));
            };
            if !segment.is_greedy() {
                match array.iter().position(|item| satisfies(item, conditions)) {
                    Some(index) => {
                        tracing::trace!(?path, index, "condition matched");
                        path.push(PathKey::Index(index));
                        continue;
                    }
                    None => {
                        tracing::debug!(query = %self.query, ?path, "no element matches");
                        return Ok(self.not_found(path));
                    }
                }
            }

            let indices: Vec<usize> = array
                .iter()
                .enumerate()
                .filter(|(_, item)| satisfies(item, conditions))
                .map(|(index, _)| index)
                .collect();
            if indices.is_empty() {
                tracing::debug!(query = %self.query, ?path, "no element matches");
                return Ok(self.not_found(path));
            }
            if depth >= self.query.max_depth {
                return Err(Error::TooDeep {
                    query: self.query.to_string().into(),
                    limit: self.query.max_depth,
                });
            }
            tracing::trace!(?path, ?indices, "expanding greedy segment");
            let rest = &segments[i + 1..];
            let mut paths = vec![];
            for index in indices {
                let mut branch = path.clone();
                branch.push(PathKey::Index(index));
                match self.resolve(rest, branch, depth + 1)? {
                    Resolution::Single(path) => paths.push(path),
                    Resolution::Multiple(more) => paths.extend(more),
                    Resolution::NotFound { .. } => {}
                }
            }
            return Ok(Resolution::Multiple(paths));
        }
        Ok(Resolution::Single(path))
    }

    fn not_found(&self, partial: Path) -> Resolution {
        Resolution::NotFound {
            partial,
            greedy: self.greedy,
        }
    }
}

/// Returns true if `item` satisfies every condition.
fn satisfies(item: &Value, conditions: &[Condition]) -> bool {
    conditions.iter().all(|condition| {
        eval_compare(
            condition.op,
            property(item, &condition.property),
            &condition.literal,
        )
    })
}

/// Returns `item[property]`.
fn property<'a>(item: &'a Value, property: &str) -> Option<&'a Value> {
    match item {
        Value::Object(object) => object.get(property),
        Value::Array(array) => property.parse::<usize>().ok().and_then(|i| array.get(i)),
        _ => None,
    }
}

/// Compare a value with a literal.
///
/// Values of different types are never equal and never ordered.
fn eval_compare(op: CompareOp, left: Option<&Value>, right: &Literal) -> bool {
    use CompareOp::*;
    match (left, right) {
        (Some(Value::Bool(left)), Literal::Bool(right)) => compare_ord(op, left, right),
        (Some(Value::Number(left)), Literal::Number(right)) => match op {
            Eq => left.equal(right),
            Ne => !left.equal(right),
            Gt => right.less_than(left),
            Ge => !left.less_than(right),
            Lt => left.less_than(right),
            Le => !right.less_than(left),
        },
        (Some(Value::String(left)), Literal::String(right)) => {
            compare_ord(op, &**left, right.as_str())
        }
        // mismatched types, or no value at all
        _ => matches!(op, Ne),
    }
}

/// Compare two values that implement `Ord`.
fn compare_ord<T: Ord>(op: CompareOp, left: T, right: T) -> bool {
    use CompareOp::*;
    match op {
        Eq => left == right,
        Ne => left != right,
        Gt => left > right,
        Ge => left >= right,
        Lt => left < right,
        Le => left <= right,
    }
}

/// Extension methods for `Number`.
trait NumberExt {
    fn equal(&self, other: &Self) -> bool;
    fn less_than(&self, other: &Self) -> bool;
}

impl NumberExt for Number {
    fn equal(&self, other: &Self) -> bool {
        // The derived `Eq` implementation of `Number` does not work
        // if the two numbers have different types. (i64, u64, f64)
        self.as_f64() == other.as_f64()
    }

    fn less_than(&self, other: &Self) -> bool {
        self.as_f64() < other.as_f64()
    }
}
