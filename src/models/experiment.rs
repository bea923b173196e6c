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

use crate::models::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    Draft,
    Running,
    Paused,
    Stopped,
}

/// A variant-local override: this variant assigns `parameterName` the value
/// `rolloutValue` (string-encoded, under `parameterDataType`).
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParameter {
    pub parameter_name: String,
    pub value: String,
    pub data_type: crate::models::parameter::DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub id: String,
    pub name: String,
    /// Declared integer percentage share of the admitted population. Across
    /// all variants of one experiment these should sum to 100; the last
    /// variant's upper bound is clamped to 100 at evaluation time regardless,
    /// so a rounding shortfall never leaves a bucket unassigned.
    pub traffic_allocation: u32,
    pub parameters: Vec<VariantParameter>,
}

/// Gates an experiment on membership in a named [`Segment`]. Unlike
/// [`crate::models::parameter::ParameterRule`]'s segment rules, spec.md §4.1
/// grants experiments no `not_match` form: an experiment's segment gate is
/// always "must match at least one of the segment's rules".
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSegmentGate {
    pub segment: Arc<Segment>,
}

/// A bucketed experiment: gated by validity window and status, optionally
/// gated by an audience segment, and then split into variants by stable hash
/// bucketing over a caller-supplied hash attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    pub status: ExperimentStatus,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    /// The attribute whose string form seeds population/variant hash keys.
    pub hash_attribute_name: String,
    /// Percentage of the bucket space, in `[0, 100]`, admitted into the
    /// experiment at all. Entities bucketed outside this population receive
    /// no variant and fall through to ordinary parameter rules.
    pub population_size: f64,
    /// `None` means the experiment applies to everybody; `Some` follows the
    /// same ANY-rule/ALL-condition semantics as [`Segment`] matching.
    pub segment_gate: Option<ExperimentSegmentGate>,
    pub variants: Vec<Variant>,
}

impl Experiment {
    /// The default validity gate: running and within its date window.
    /// Callers that need a different policy can use
    /// [`crate::evaluation::experiment::evaluate_with_validity`] directly.
    pub(crate) fn is_valid(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.status == ExperimentStatus::Running
            && self.start_date <= now
            && now <= self.end_date
    }
}
