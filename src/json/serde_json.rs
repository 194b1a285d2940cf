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

use std::str::FromStr;
use std::sync::Arc;

use ::serde::ser::{SerializeMap, SerializeSeq};
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::*;

impl From<::serde_json::Value> for Value {
    fn from(value: ::serde_json::Value) -> Self {
        match value {
            ::serde_json::Value::Null => Value::Null,
            ::serde_json::Value::Bool(b) => Value::Bool(b),
            ::serde_json::Value::Number(n) => Value::Number(n),
            ::serde_json::Value::String(s) => Value::String(s.into()),
            ::serde_json::Value::Array(array) => {
                Value::Array(Arc::new(array.into_iter().map(Value::from).collect()))
            }
            ::serde_json::Value::Object(object) => Value::Object(Arc::new(
                object.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<&Value> for ::serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Undefined | Value::Null => ::serde_json::Value::Null,
            Value::Bool(b) => ::serde_json::Value::Bool(*b),
            Value::Number(n) => ::serde_json::Value::Number(n.clone()),
            Value::String(s) => ::serde_json::Value::String(s.to_string()),
            Value::Array(array) => {
                ::serde_json::Value::Array(array.iter().map(::serde_json::Value::from).collect())
            }
            Value::Object(object) => ::serde_json::Value::Object(
                object
                    .iter()
                    .map(|(k, v)| (k.clone(), ::serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for ::serde_json::Value {
    fn from(value: Value) -> Self {
        ::serde_json::Value::from(&value)
    }
}

impl FromStr for Value {
    type Err = ::serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ::serde_json::from_str::<::serde_json::Value>(s).map(Value::from)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for v in array.iter() {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (k, v) in object.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ::serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
