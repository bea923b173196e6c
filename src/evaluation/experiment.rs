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

use chrono::{DateTime, Utc};

use crate::attributes::Attributes;
use crate::evaluation::hash::in_bucket;
use crate::evaluation::segment;
use crate::models::experiment::Experiment;
use crate::models::parameter::DataType;

/// The outcome of a matched experiment: the variant's override for the
/// requested parameter, plus enough detail (experiment/variant identity) to
/// attach to an evaluation event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExperimentMatch {
    pub value: String,
    pub data_type: DataType,
    pub experiment_id: String,
    pub variant_id: String,
    pub variant_name: String,
}

/// Evaluates one experiment against an attribute bag for a given parameter
/// name. `is_valid` is the pluggable validity gate; callers pass
/// [`Experiment::is_valid`]-equivalent logic or their own policy.
pub(crate) fn evaluate(
    experiment: &Experiment,
    attributes: &Attributes,
    parameter_name: &str,
    now: DateTime<Utc>,
) -> Option<ExperimentMatch> {
    evaluate_with_validity(experiment, attributes, parameter_name, |e| e.is_valid(now))
}

pub(crate) fn evaluate_with_validity(
    experiment: &Experiment,
    attributes: &Attributes,
    parameter_name: &str,
    is_valid: impl Fn(&Experiment) -> bool,
) -> Option<ExperimentMatch> {
    if !is_valid(experiment) {
        return None;
    }

    if let Some(gate) = &experiment.segment_gate {
        if !segment::matches(&gate.segment, attributes) {
            return None;
        }
    }

    let hash_value = attributes
        .get(&experiment.hash_attribute_name)
        .map(|v| v.to_shortest_string())
        .unwrap_or_default();

    let population_key = format!("experiment:population:{}:{}", experiment.id, hash_value);
    if !in_bucket(&population_key, 0.0, experiment.population_size) {
        return None;
    }

    if experiment.variants.is_empty() {
        return None;
    }

    let variant_key = format!("experiment:hash:{}:{}", experiment.id, hash_value);
    let total = experiment.variants.len();
    let mut cumulative = 0.0_f64;
    let mut chosen = None;
    for (i, variant) in experiment.variants.iter().enumerate() {
        let lower = cumulative;
        let upper = if i == total - 1 {
            100.0
        } else {
            cumulative + variant.traffic_allocation as f64
        };
        if in_bucket(&variant_key, lower, upper) {
            chosen = Some(variant);
            break;
        }
        cumulative += variant.traffic_allocation as f64;
    }

    let variant = chosen?;
    let assignment = variant.parameters.iter().find(|p| p.parameter_name == parameter_name)?;

    Some(ExperimentMatch {
        value: assignment.value.clone(),
        data_type: assignment.data_type,
        experiment_id: experiment.id.clone(),
        variant_id: variant.id.clone(),
        variant_name: variant.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::models::experiment::fixtures::fifty_fifty;
    use std::collections::HashMap;

    fn attrs_for(user_id: i64) -> Attributes {
        let mut a = HashMap::new();
        a.insert("user_id".to_string(), AttributeValue::Number(user_id as f64));
        a
    }

    #[test]
    fn full_population_split_s1() {
        let experiment = fifty_fifty("b7fb8970-0000-0000-0000-000000007641", "enableAuth");
        let mut control = 0;
        let mut treatment = 0;
        let mut admitted = 0;
        for user_id in 1..=1000 {
            if let Some(result) = evaluate(&experiment, &attrs_for(user_id), "enableAuth", Utc::now()) {
                admitted += 1;
                if result.value == "true" {
                    treatment += 1;
                } else {
                    control += 1;
                }
            }
        }
        assert_eq!(admitted, 1000);
        assert_eq!(control + treatment, 1000);
    }

    #[test]
    fn sixty_percent_population_s2() {
        let mut experiment = fifty_fifty("uuid-60", "enableAuth");
        experiment.population_size = 60.0;
        let mut admitted = 0;
        let mut not_admitted = 0;
        for user_id in 1..=200 {
            match evaluate(&experiment, &attrs_for(user_id), "enableAuth", Utc::now()) {
                Some(_) => admitted += 1,
                None => not_admitted += 1,
            }
        }
        assert_eq!(admitted + not_admitted, 200);
        assert!((admitted as i64 - 120).abs() <= 10, "admitted={admitted}");
    }

    #[test]
    fn invalid_experiment_never_matches() {
        let mut experiment = fifty_fifty("uuid-paused", "enableAuth");
        experiment.status = crate::models::experiment::ExperimentStatus::Paused;
        assert!(evaluate(&experiment, &attrs_for(1), "enableAuth", Utc::now()).is_none());
    }

    #[test]
    fn unknown_parameter_in_variant_does_not_match() {
        let experiment = fifty_fifty("uuid-x", "enableAuth");
        assert!(evaluate(&experiment, &attrs_for(1), "some_other_param", Utc::now()).is_none());
    }
}