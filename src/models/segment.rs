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

/// A named, reusable collection of [`SegmentRule`]s.
///
/// A segment matches an attribute bag iff **any** of its rules matches
/// (OR across rules); a rule matches iff **all** of its conditions match
/// (AND within a rule). Segment rules only ever hold conditions — never a
/// nested segment reference — so segments can never form reference cycles
/// and need no post-fetch resolution of their own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub name: String,
    pub rules: Vec<SegmentRule>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRule {
    pub conditions: Vec<Condition>,
}

impl Segment {
    /// A zero-rule segment never matches anybody: vacuous truth over an
    /// empty rule list would otherwise match every attribute bag.
    pub(crate) fn is_vacuous(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::condition::{AttributeDataType, Operator};

    pub(crate) fn segment_age_over_30() -> Segment {
        Segment {
            id: "seg_over_30".into(),
            name: "over 30".into(),
            rules: vec![SegmentRule {
                conditions: vec![Condition {
                    attribute_name: "age".into(),
                    attribute_data_type: AttributeDataType::Number,
                    operator: Operator::GreaterThan,
                    value: "30".into(),
                    enum_options: None,
                }],
            }],
        }
    }
}