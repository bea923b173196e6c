// (C) Copyright IBM Corp. 2024.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;

use serde::Serialize;

/// A single typed attribute value carried in an [`Attributes`] bag.
///
/// Mirrors the three JSON-representable scalar kinds the wire format
/// understands: string, IEEE-754 double, and boolean.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Shortest round-trip decimal representation, used when comparing a
    /// numeric attribute against an `in`/`not_in` list of strings.
    pub fn to_shortest_string(&self) -> String {
        match self {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Number(n) => format!("{n}"),
            AttributeValue::Boolean(b) => b.to_string(),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

/// A caller-owned bag of attribute name -> typed value.
///
/// Order is not significant. The SDK never mutates a caller's bag; it is
/// shallow-copied whenever attached to an evaluation event, since the event
/// may outlive the call that produced it.
pub type Attributes = HashMap<String, AttributeValue>;

/// Snapshots the bag for attachment to an evaluation event, since the
/// caller's own bag may be reused or mutated after the call returns.
pub(crate) fn snapshot(attributes: &Attributes) -> Attributes {
    attributes.clone()
}