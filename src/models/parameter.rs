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

use crate::models::condition::Condition;
use crate::models::segment::Segment;
use std::sync::Arc;

/// The declared type of a parameter's rollout value. Distinct from
/// [`crate::models::condition::AttributeDataType`] — there is no `enum`
/// variant here, since a rollout value is never an enum on its own, only an
/// attribute being matched against one can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Number,
    Boolean,
}

/// A targetable configuration parameter: a name, its declared value type, a
/// default rollout value, and an ordered list of rules that can override the
/// default for matching attribute bags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
    pub default_value: String,
    #[serde(default)]
    pub rules: Vec<ParameterRule>,
}

/// One entry in a [`Parameter`]'s rule list.
///
/// Rules are evaluated in order; the first one that matches wins. An
/// attribute-type rule matches when all of its conditions match the caller's
/// attribute bag directly. A segment-type rule instead asks whether a
/// resolved [`Segment`] matches (or, for `not_match`, does not match) the
/// bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRule {
    pub value: String,
    pub kind: RuleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Attribute { conditions: Vec<Condition> },
    Segment { segment: Arc<Segment>, negate: bool },
}

impl ParameterRule {
    /// An attribute-type rule with zero conditions never matches: vacuous
    /// truth over an empty condition list would otherwise let it win every
    /// evaluation regardless of the attribute bag.
    pub(crate) fn is_vacuous(&self) -> bool {
        matches!(&self.kind, RuleKind::Attribute { conditions } if conditions.is_empty())
    }
}
