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
use crate::models::parameter::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    ParameterEvaluation,
    ExperimentEvaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventSource {
    Parameter,
    Experiment,
}

/// One evaluation's telemetry record. Constructed by the client façade on
/// every `evaluate_parameter` call, queued into the [`crate::events::batcher::EventBatcher`].
#[derive(Debug, Clone)]
pub struct EvaluationEvent {
    pub event_id: String,
    pub service_name: String,
    pub event_type: EventType,
    pub parameter_name: String,
    pub(crate) source: EventSource,
    pub attributes: Attributes,
    pub timestamp: DateTime<Utc>,
    pub rollout_value: Option<String>,
    pub data_type: Option<DataType>,
    pub error: Option<String>,
    pub experiment_id: Option<String>,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
}

impl EvaluationEvent {
    /// Fixed per-event byte-size estimate used by the batcher's
    /// `flushBytes` gate. A constant avoids re-serializing every event just
    /// to size it; exact precision isn't needed for a flush threshold.
    pub(crate) const APPROXIMATE_SIZE_BYTES: usize = 256;
}