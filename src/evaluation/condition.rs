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

use crate::attributes::{AttributeValue, Attributes};
use crate::models::condition::{AttributeDataType, Condition, Operator};
use crate::value::parse_bool;

/// Evaluates one condition against an attribute bag.
///
/// Never errors. Any mismatch — the attribute is absent, is the wrong type,
/// or the condition's `value` fails to parse under the declared data type —
/// evaluates to `false` and lets the caller move on to the next rule.
pub(crate) fn evaluate(condition: &Condition, attributes: &Attributes) -> bool {
    let Some(attribute) = attributes.get(&condition.attribute_name) else {
        return false;
    };

    match condition.attribute_data_type {
        AttributeDataType::String => evaluate_string(condition, attribute),
        AttributeDataType::Number => evaluate_number(condition, attribute),
        AttributeDataType::Boolean => evaluate_boolean(condition, attribute),
        AttributeDataType::Enum => evaluate_enum(condition, attribute),
    }
}

fn evaluate_string(condition: &Condition, attribute: &AttributeValue) -> bool {
    let Some(value) = attribute.as_str() else {
        return false;
    };
    match condition.operator {
        Operator::Equals => value == condition.value,
        Operator::NotEquals => value != condition.value,
        Operator::Contains => value.contains(condition.value.as_str()),
        Operator::NotContains => !value.contains(condition.value.as_str()),
        Operator::In => split_list(&condition.value).any(|candidate| candidate == value),
        Operator::NotIn => !split_list(&condition.value).any(|candidate| candidate == value),
        _ => false,
    }
}

fn evaluate_number(condition: &Condition, attribute: &AttributeValue) -> bool {
    let Some(value) = attribute.as_f64() else {
        return false;
    };
    match condition.operator {
        Operator::In | Operator::NotIn => {
            let rendered = attribute.to_shortest_string();
            let found = split_list(&condition.value).any(|candidate| candidate == rendered);
            if condition.operator == Operator::In {
                found
            } else {
                !found
            }
        }
        _ => {
            let Ok(rhs) = condition.value.parse::<f64>() else {
                return false;
            };
            match condition.operator {
                Operator::Equals => value == rhs,
                Operator::NotEquals => value != rhs,
                Operator::GreaterThan => value > rhs,
                Operator::LessThan => value < rhs,
                Operator::GreaterThanOrEqual => value >= rhs,
                Operator::LessThanOrEqual => value <= rhs,
                _ => false,
            }
        }
    }
}

fn evaluate_boolean(condition: &Condition, attribute: &AttributeValue) -> bool {
    let Some(value) = attribute.as_bool() else {
        return false;
    };
    let Some(rhs) = parse_bool(&condition.value) else {
        return false;
    };
    match condition.operator {
        Operator::Equals => value == rhs,
        Operator::NotEquals => value != rhs,
        _ => false,
    }
}

fn evaluate_enum(condition: &Condition, attribute: &AttributeValue) -> bool {
    let Some(value) = attribute.as_str() else {
        return false;
    };
    let Some(options) = &condition.enum_options else {
        return false;
    };
    if !options.iter().any(|option| option == value) {
        return false;
    }
    matches!(condition.operator, Operator::Equals) && value == condition.value
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bag(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect::<HashMap<_, _>>()
    }

    fn cond(attr: &str, dtype: AttributeDataType, op: Operator, value: &str) -> Condition {
        Condition {
            attribute_name: attr.to_string(),
            attribute_data_type: dtype,
            operator: op,
            value: value.to_string(),
            enum_options: None,
        }
    }

    #[test]
    fn missing_attribute_is_false() {
        let c = cond("country", AttributeDataType::String, Operator::Equals, "US");
        assert!(!evaluate(&c, &bag(&[])));
    }

    #[test]
    fn string_equals() {
        let c = cond("country", AttributeDataType::String, Operator::Equals, "US");
        assert!(evaluate(&c, &bag(&[("country", AttributeValue::String("US".into()))])));
        assert!(!evaluate(&c, &bag(&[("country", AttributeValue::String("FR".into()))])));
    }

    #[test]
    fn number_greater_than() {
        let c = cond("age", AttributeDataType::Number, Operator::GreaterThan, "30");
        assert!(evaluate(&c, &bag(&[("age", AttributeValue::Number(40.0))])));
        assert!(!evaluate(&c, &bag(&[("age", AttributeValue::Number(20.0))])));
    }

    #[test]
    fn number_in_uses_shortest_round_trip_rendering() {
        let c = cond("age", AttributeDataType::Number, Operator::In, "1,2,3");
        assert!(evaluate(&c, &bag(&[("age", AttributeValue::Number(2.0))])));
        assert!(!evaluate(&c, &bag(&[("age", AttributeValue::Number(4.0))])));
    }

    #[test]
    fn boolean_equals_accepts_documented_literal_forms() {
        let c = cond("is_admin", AttributeDataType::Boolean, Operator::Equals, "true");
        assert!(evaluate(&c, &bag(&[("is_admin", AttributeValue::Boolean(true))])));
    }

    #[test]
    fn wrong_type_is_false_not_error() {
        let c = cond("age", AttributeDataType::Number, Operator::GreaterThan, "30");
        assert!(!evaluate(&c, &bag(&[("age", AttributeValue::String("forty".into()))])));
    }

    #[test]
    fn enum_requires_membership_and_equality() {
        let mut c = cond("plan", AttributeDataType::Enum, Operator::Equals, "gold");
        c.enum_options = Some(vec!["gold".into(), "silver".into()]);
        assert!(evaluate(&c, &bag(&[("plan", AttributeValue::String("gold".into()))])));
        assert!(!evaluate(&c, &bag(&[("plan", AttributeValue::String("bronze".into()))])));
    }
}