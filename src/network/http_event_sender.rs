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

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::attributes::Attributes;
use crate::events::event::{EvaluationEvent, EventSource, EventType};
use crate::events::sender::EventSender;
use crate::fetch::NetworkError;

/// Default [`EventSender`]: `POST {endpoint}/api/v1/sdk/events` with a
/// `{ "events": [...] }` envelope.
pub struct HttpEventSender {
    endpoint: String,
    client: Client,
}

impl HttpEventSender {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client construction with only a timeout never fails");
        HttpEventSender { endpoint: endpoint.into(), client }
    }
}

impl EventSender for HttpEventSender {
    fn send(&self, events: Vec<EvaluationEvent>) -> Result<(), NetworkError> {
        let url = format!("{}/api/v1/sdk/events", self.endpoint);
        let body = EventsRequest {
            events: events.iter().map(EventWire::from).collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|source| NetworkError::Request { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(NetworkError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        let ack: EventsAck = response.json().map_err(|source| NetworkError::Decode { url, source })?;
        if ack.failed > 0 {
            log::warn!("upstream rejected {} of {} events", ack.failed, ack.processed + ack.failed);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct EventsRequest {
    events: Vec<EventWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventWire {
    event_id: String,
    service_name: String,
    event_type: &'static str,
    parameter_name: String,
    source: &'static str,
    user_attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    rollout_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    experiment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_name: Option<String>,
}

impl From<&EvaluationEvent> for EventWire {
    fn from(event: &EvaluationEvent) -> Self {
        EventWire {
            event_id: event.event_id.clone(),
            service_name: event.service_name.clone(),
            event_type: match event.event_type {
                EventType::ParameterEvaluation => "parameter_evaluation",
                EventType::ExperimentEvaluation => "experiment_evaluation",
            },
            parameter_name: event.parameter_name.clone(),
            source: match event.source {
                EventSource::Parameter => "parameter",
                EventSource::Experiment => "experiment",
            },
            user_attributes: event.attributes.clone(),
            rollout_value: event.rollout_value.clone(),
            error: event.error.clone(),
            timestamp: event.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            experiment_id: event.experiment_id.clone(),
            variant_id: event.variant_id.clone(),
            variant_name: event.variant_name.clone(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct EventsAck {
    #[serde(default)]
    processed: u64,
    #[serde(default)]
    failed: u64,
}
