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

use crate::attributes::Attributes;
use crate::evaluation::condition;
use crate::models::segment::Segment;

/// A segment matches iff any of its rules matches; a rule matches iff all of
/// its conditions match. A zero-rule segment never matches anybody.
pub(crate) fn matches(segment: &Segment, attributes: &Attributes) -> bool {
    if segment.is_vacuous() {
        return false;
    }
    segment
        .rules
        .iter()
        .any(|rule| rule.conditions.iter().all(|c| condition::evaluate(c, attributes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment::fixtures::segment_age_over_30;
    use std::collections::HashMap;

    #[test]
    fn matches_when_any_rule_matches() {
        let segment = segment_age_over_30();
        let mut attrs = HashMap::new();
        attrs.insert("age".to_string(), crate::attributes::AttributeValue::Number(40.0));
        assert!(matches(&segment, &attrs));
    }

    #[test]
    fn does_not_match_below_threshold() {
        let segment = segment_age_over_30();
        let mut attrs = HashMap::new();
        attrs.insert("age".to_string(), crate::attributes::AttributeValue::Number(20.0));
        assert!(!matches(&segment, &attrs));
    }

    #[test]
    fn zero_rule_segment_never_matches() {
        let segment = Segment {
            id: "empty".into(),
            name: "empty".into(),
            rules: Vec::new(),
        };
        assert!(!matches(&segment, &HashMap::new()));
    }
}