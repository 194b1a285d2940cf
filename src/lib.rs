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

//! Golden path queries over nested JSON values.
//!
//! A golden path is a `.`-separated list of keys and indices, where an array
//! step may instead be selected by conditions on its elements:
//!
//! - `peoples.0.name` walks keys and indices.
//! - `peoples[id=1]` selects the first element whose `id` is `1`.
//! - `peoples[id=1][other=true]` requires both conditions.
//! - `peoples*[sex='male'].name` selects every matching element.
//! - `peoples.*` selects every element.
//!
//! Operators are `=`, `!=`, `>`, `>=`, `<` and `<=`. Literals that contain the
//! query's own syntax can be embedded with [`escape`].
//!
//! # Usage
//!
//! ```rust
//! use golden_path::{get, update, Value};
//!
//! let root: Value = r#"{"peoples": [{"id": 1, "name": "islam"}, {"id": 2, "name": "sabel"}]}"#
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(get("peoples[id=2].name", &root).unwrap(), Value::from("sabel"));
//! assert_eq!(
//!     get("peoples.*.id", &root).unwrap(),
//!     Value::from(vec![Value::from(1), Value::from(2)]),
//! );
//!
//! let updated = update("peoples[id=1].name", Value::from("max"), &root).unwrap();
//! assert_eq!(get("peoples.0.name", &updated).unwrap(), Value::from("max"));
//! // the original is untouched
//! assert_eq!(get("peoples.0.name", &root).unwrap(), Value::from("islam"));
//! ```

mod eval;
pub mod json;
mod node;
mod parser;

use eval::Result;

pub use eval::{Error, Resolution, Update};
pub use json::Value;
pub use node::{
    CompareOp, Condition, GoldenPath, Literal, Path, PathKey, Segment, DEFAULT_MAX_DEPTH,
};
pub use parser::{escape, Error as ParseError, ESCAPE_MARKER};

/// Returns the value at `query` in `root`.
///
/// See [`GoldenPath::get`].
pub fn get(query: &str, root: &Value) -> Result<Value> {
    let path = GoldenPath::new(query).map_err(|source| Error::MalformedQuery {
        query: query.into(),
        source,
    })?;
    path.get(root)
}

/// Returns a copy of `root` with the value at `query` replaced or updated.
///
/// See [`GoldenPath::update`].
pub fn update<'f>(query: &str, update: impl Into<Update<'f>>, root: &Value) -> Result<Value> {
    let update = update.into();
    let path = match GoldenPath::new(query) {
        Ok(path) => path,
        Err(source) => {
            return Err(Error::MalformedUpdate {
                query: query.into(),
                value: update.to_string().into(),
                source,
            })
        }
    };
    path.update(update, root)
}
