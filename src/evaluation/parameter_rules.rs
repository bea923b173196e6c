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
use crate::evaluation::{condition, segment};
use crate::models::parameter::{Parameter, RuleKind};

/// Returns the rollout value (still string-encoded) a [`Parameter`] resolves
/// to for the given attribute bag: the first matching rule's value in
/// declared order, or the parameter's default when none match.
pub(crate) fn evaluate(parameter: &Parameter, attributes: &Attributes) -> String {
    for rule in &parameter.rules {
        if rule.is_vacuous() {
            continue;
        }
        let matched = match &rule.kind {
            RuleKind::Attribute { conditions } => conditions.iter().all(|c| condition::evaluate(c, attributes)),
            RuleKind::Segment { segment: seg, negate } => {
                let is_match = segment::matches(seg, attributes);
                if *negate {
                    !is_match
                } else {
                    is_match
                }
            }
        };
        if matched {
            return rule.value.clone();
        }
    }
    parameter.default_value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::models::condition::{AttributeDataType, Condition, Operator};
    use crate::models::parameter::{DataType, ParameterRule};
    use crate::models::segment::fixtures::segment_age_over_30;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn welcome_message_parameter() -> Parameter {
        Parameter {
            name: "welcome_message".into(),
            data_type: DataType::String,
            default_value: "Hi".into(),
            rules: vec![ParameterRule {
                value: "Hello".into(),
                kind: RuleKind::Attribute {
                    conditions: vec![Condition {
                        attribute_name: "country".into(),
                        attribute_data_type: AttributeDataType::String,
                        operator: Operator::Equals,
                        value: "US".into(),
                        enum_options: None,
                    }],
                },
            }],
        }
    }

    #[test]
    fn attribute_rule_precedence_s3() {
        let parameter = welcome_message_parameter();
        let mut us = HashMap::new();
        us.insert("country".to_string(), AttributeValue::String("US".into()));
        assert_eq!(evaluate(&parameter, &us), "Hello");

        let mut fr = HashMap::new();
        fr.insert("country".to_string(), AttributeValue::String("FR".into()));
        assert_eq!(evaluate(&parameter, &fr), "Hi");
    }

    #[test]
    fn segment_not_match_s4() {
        let parameter = Parameter {
            name: "beta".into(),
            data_type: DataType::String,
            default_value: "off".into(),
            rules: vec![ParameterRule {
                value: "on".into(),
                kind: RuleKind::Segment {
                    segment: Arc::new(segment_age_over_30()),
                    negate: true,
                },
            }],
        };

        let mut under = HashMap::new();
        under.insert("age".to_string(), AttributeValue::Number(20.0));
        assert_eq!(evaluate(&parameter, &under), "on");

        let mut over = HashMap::new();
        over.insert("age".to_string(), AttributeValue::Number(40.0));
        assert_eq!(evaluate(&parameter, &over), "off");
    }

    #[test]
    fn empty_rules_returns_default() {
        let parameter = Parameter {
            name: "x".into(),
            data_type: DataType::String,
            default_value: "default".into(),
            rules: Vec::new(),
        };
        assert_eq!(evaluate(&parameter, &HashMap::new()), "default");
    }

    #[test]
    fn vacuous_attribute_rule_never_matches() {
        let parameter = Parameter {
            name: "x".into(),
            data_type: DataType::String,
            default_value: "default".into(),
            rules: vec![ParameterRule {
                value: "never".into(),
                kind: RuleKind::Attribute { conditions: Vec::new() },
            }],
        };
        assert_eq!(evaluate(&parameter, &HashMap::new()), "default");
    }
}