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

use serde::Deserialize;

/// The declared type of the right-hand side of a [`Condition`]. This is
/// distinct from [`crate::models::parameter::DataType`]: a parameter's
/// `dataType` describes the *rollout value*, while a condition's
/// `attributeDataType` describes the *attribute being matched* and additionally
/// allows `enum`, which has no counterpart as a rollout value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDataType {
    String,
    Number,
    Boolean,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// One matcher clause: `attributeName <operator> value`.
///
/// `value` is always string-encoded on the wire; `in`/`not_in` pack a
/// comma-separated list into it. `enumOptions` is only meaningful when
/// `attributeDataType == Enum`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub attribute_name: String,
    pub attribute_data_type: AttributeDataType,
    pub operator: Operator,
    pub value: String,
    #[serde(default)]
    pub enum_options: Option<Vec<String>>,
}