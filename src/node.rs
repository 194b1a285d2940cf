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

//! The AST of golden path queries.

use std::borrow::Cow;
use std::fmt::Display;
use std::fmt::Formatter;

use serde_json::Number;

use crate::parser::ESCAPE_MARKER;

/// The default limit of nested greedy expansions.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A compiled golden path query.
///
/// Parsing is purely lexical. Conditions and wildcards are evaluated against a
/// concrete value by [`GoldenPath::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenPath {
    pub(crate) segments: Vec<Segment>,
    pub(crate) max_depth: usize,
}

impl GoldenPath {
    /// Sets the maximum number of nested greedy expansions.
    ///
    /// Resolution fails with [`Error::TooDeep`](crate::Error::TooDeep) when a
    /// query would expand deeper than this.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The maximum number of nested greedy expansions.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The segments of the query, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the query contains a wildcard or a greedy condition group.
    ///
    /// Greedy queries always select a list of values.
    pub fn is_greedy(&self) -> bool {
        self.segments.iter().any(Segment::is_greedy)
    }
}

/// One unit of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A mapping key or sequence index, like `friends` or `0`.
    Key(PathKey),
    /// `*` selects every element of a sequence.
    Wildcard,
    /// `[id=1][other=true]` selects the first element satisfying all conditions.
    /// `*[id=1]` selects every such element.
    Filter {
        greedy: bool,
        conditions: Vec<Condition>,
    },
}

impl Segment {
    pub(crate) fn is_greedy(&self) -> bool {
        match self {
            Segment::Key(_) => false,
            Segment::Wildcard => true,
            Segment::Filter { greedy, .. } => *greedy,
        }
    }
}

/// A concrete step of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl PathKey {
    /// Digit-only keys address sequence elements.
    pub(crate) fn normalize(key: String) -> Self {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = key.parse() {
                return PathKey::Index(index);
            }
        }
        PathKey::Key(key)
    }

    /// The step as a mapping key. Indices are written in decimal.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathKey::Key(key) => Cow::Borrowed(key),
            PathKey::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_owned())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        PathKey::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// A fully resolved path with no remaining conditions.
pub type Path = Vec<PathKey>;

/// A single `[property op literal]` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub property: String,
    pub op: CompareOp,
    pub literal: Literal,
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `true` or `false`.
    Bool(bool),
    /// Decimal number.
    Number(Number),
    /// Quoted text or a bare word.
    String(String),
}

/// Wraps `s` in escape markers if it is empty or contains any of `specials`.
fn write_escaped(f: &mut Formatter<'_>, s: &str, specials: &str) -> std::fmt::Result {
    if s.is_empty() || s.contains(|c| specials.contains(c)) || s.contains(ESCAPE_MARKER) {
        write!(f, "{ESCAPE_MARKER}{s}{ESCAPE_MARKER}")
    } else {
        write!(f, "{s}")
    }
}

impl Display for GoldenPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut prev: Option<&Segment> = None;
        for segment in &self.segments {
            let dot = match (prev, segment) {
                (None, _) => false,
                (Some(_), Segment::Key(_) | Segment::Wildcard) => true,
                // `*[` and `][` would be read as part of the previous segment
                (Some(Segment::Wildcard | Segment::Filter { .. }), Segment::Filter { .. }) => true,
                (Some(Segment::Key(_)), Segment::Filter { .. }) => false,
            };
            if dot {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
            prev = Some(segment);
        }
        Ok(())
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Wildcard => write!(f, "*"),
            Self::Filter { greedy, conditions } => {
                if *greedy {
                    write!(f, "*")?;
                }
                for condition in conditions {
                    write!(f, "{condition}")?;
                }
                Ok(())
            }
        }
    }
}

impl Display for PathKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write_escaped(f, key, ".[]*!=<>"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        write_escaped(f, &self.property, "[]!=<>")?;
        write!(f, "{}{}]", self.op, self.literal)
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => {
                write!(f, "'")?;
                write_escaped(f, v, "[]'")?;
                write!(f, "'")
            }
        }
    }
}
