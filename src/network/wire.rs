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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::condition::Condition;
use crate::models::experiment::{Experiment, ExperimentSegmentGate, ExperimentStatus, Variant, VariantParameter};
use crate::models::parameter::{DataType, Parameter, ParameterRule, RuleKind};
use crate::models::segment::Segment;

#[derive(Debug, Deserialize)]
pub(crate) struct ParametersResponse {
    pub parameters: Vec<ParameterWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExperimentsResponse {
    pub experiments: Vec<ExperimentWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SegmentsResponse {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParameterWire {
    pub name: String,
    pub data_type: DataType,
    pub default_rollout_value: String,
    #[serde(default)]
    pub rules: Vec<ParameterRuleWire>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub(crate) enum ParameterRuleWire {
    Attribute {
        rollout_value: String,
        conditions: Vec<Condition>,
    },
    Segment {
        rollout_value: String,
        segment_id: String,
        match_type: MatchType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MatchType {
    Match,
    NotMatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExperimentWire {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: ExperimentStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub hash_attribute_name: String,
    pub population_size: f64,
    #[serde(default)]
    pub segment_id: Option<String>,
    pub variants: Vec<VariantWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantWire {
    pub id: String,
    pub name: String,
    pub traffic_allocation: u32,
    #[serde(default)]
    pub parameters: Vec<VariantParameterWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantParameterWire {
    pub parameter_name: String,
    pub rollout_value: String,
    pub parameter_data_type: DataType,
}

/// Converts a wire parameter into the runtime model, resolving every
/// segment-type rule's `segmentId` against `resolve_segment`. A rule whose
/// segment cannot be resolved is dropped: an unresolvable segment can never
/// match, and dropping it from the ordered list achieves exactly that
/// without special-casing evaluation.
pub(crate) fn into_parameter(wire: ParameterWire, resolve_segment: &dyn Fn(&str) -> Option<Arc<Segment>>) -> Parameter {
    let mut rules = Vec::with_capacity(wire.rules.len());
    for rule in wire.rules {
        match rule {
            ParameterRuleWire::Attribute { rollout_value, conditions } => {
                rules.push(ParameterRule {
                    value: rollout_value,
                    kind: RuleKind::Attribute { conditions },
                });
            }
            ParameterRuleWire::Segment { rollout_value, segment_id, match_type } => {
                match resolve_segment(&segment_id) {
                    Some(segment) => rules.push(ParameterRule {
                        value: rollout_value,
                        kind: RuleKind::Segment {
                            segment,
                            negate: match_type == MatchType::NotMatch,
                        },
                    }),
                    None => log::warn!("parameter '{}' references unknown segment '{segment_id}'", wire.name),
                }
            }
        }
    }
    Parameter {
        name: wire.name,
        data_type: wire.data_type,
        default_value: wire.default_rollout_value,
        rules,
    }
}

pub(crate) fn into_experiment(wire: ExperimentWire, resolve_segment: &dyn Fn(&str) -> Option<Arc<Segment>>) -> Experiment {
    let wire_id = wire.id.clone();
    let segment_gate = wire.segment_id.map(|segment_id| match resolve_segment(&segment_id) {
        Some(segment) => ExperimentSegmentGate { segment },
        None => {
            log::warn!("experiment '{wire_id}' references unknown segment '{segment_id}'; gate fails closed");
            ExperimentSegmentGate {
                segment: Arc::new(Segment {
                    id: segment_id,
                    name: String::new(),
                    rules: Vec::new(),
                }),
            }
        }
    });

    Experiment {
        name: wire.name.unwrap_or_else(|| wire.id.clone()),
        id: wire.id,
        status: wire.status,
        start_date: wire.start_date,
        end_date: wire.end_date,
        hash_attribute_name: wire.hash_attribute_name,
        population_size: wire.population_size,
        segment_gate,
        variants: wire.variants.into_iter().map(into_variant).collect(),
    }
}

fn into_variant(wire: VariantWire) -> Variant {
    Variant {
        id: wire.id,
        name: wire.name,
        traffic_allocation: wire.traffic_allocation,
        parameters: wire
            .parameters
            .into_iter()
            .map(|p| VariantParameter {
                parameter_name: p.parameter_name,
                value: p.rollout_value,
                data_type: p.parameter_data_type,
            })
            .collect(),
    }
}