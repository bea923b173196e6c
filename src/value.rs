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

use crate::errors::Error;
use crate::models::parameter::DataType;

/// The typed outcome of an evaluation.
///
/// Immutable after construction. `AsString`/`AsNumber`/`AsInt`/`AsBool`
/// never panic and never propagate a parse failure: each falls back to the
/// caller-supplied default whenever an error is carried, the declared
/// [`DataType`] disagrees with the accessor, or the underlying string fails
/// to parse under that type.
#[derive(Debug)]
pub struct RolloutValue {
    raw: Option<String>,
    data_type: Option<DataType>,
    error: Option<Error>,
}

impl RolloutValue {
    pub(crate) fn new(raw: String, data_type: DataType) -> Self {
        RolloutValue {
            raw: Some(raw),
            data_type: Some(data_type),
            error: None,
        }
    }

    pub(crate) fn from_error(error: Error) -> Self {
        RolloutValue {
            raw: None,
            data_type: None,
            error: Some(error),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn as_string(&self, default: &str) -> String {
        if self.has_error() {
            return default.to_string();
        }
        match (&self.raw, self.data_type) {
            (Some(raw), Some(DataType::String)) => raw.clone(),
            _ => default.to_string(),
        }
    }

    pub fn as_number(&self, default: f64) -> f64 {
        if self.has_error() {
            return default;
        }
        match (&self.raw, self.data_type) {
            (Some(raw), Some(DataType::Number)) => raw.parse::<f64>().unwrap_or(default),
            _ => default,
        }
    }

    /// Parses the string as a base-10 integer, never by truncating a float.
    pub fn as_int(&self, default: i64) -> i64 {
        if self.has_error() {
            return default;
        }
        match (&self.raw, self.data_type) {
            (Some(raw), Some(DataType::Number)) => raw.parse::<i64>().unwrap_or(default),
            _ => default,
        }
    }

    pub fn as_bool(&self, default: bool) -> bool {
        if self.has_error() {
            return default;
        }
        match (&self.raw, self.data_type) {
            (Some(raw), Some(DataType::Boolean)) => parse_bool(raw).unwrap_or(default),
            _ => default,
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_typed_rejects_bool_accessor() {
        let value = RolloutValue::new("hello".into(), DataType::String);
        assert!(!value.has_error());
        assert_eq!(value.as_bool(true), true);
        assert_eq!(value.as_string("fallback"), "hello");
    }

    #[test]
    fn error_carrying_value_always_falls_back() {
        let value = RolloutValue::from_error(Error::ParameterNotFound("missing".into()));
        assert!(value.has_error());
        assert_eq!(value.as_string("x"), "x");
        assert_eq!(value.as_number(1.5), 1.5);
        assert_eq!(value.as_int(7), 7);
        assert_eq!(value.as_bool(true), true);
    }

    #[test]
    fn as_int_parses_base_10_not_float_truncation() {
        let value = RolloutValue::new("42".into(), DataType::Number);
        assert_eq!(value.as_int(0), 42);
        let value = RolloutValue::new("42.9".into(), DataType::Number);
        assert_eq!(value.as_int(-1), -1);
    }

    #[test]
    fn bool_accepts_documented_literal_forms() {
        for literal in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(literal), Some(true), "{literal}");
        }
        for literal in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(literal), Some(false), "{literal}");
        }
        assert_eq!(parse_bool("yes"), None);
    }
}