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

//! Test-only constructors exposed behind the `test_utils` feature: a
//! way for a downstream crate's own test suite to stand up a [`Client`]
//! against canned data without a live upstream.

use std::sync::Arc;

use crate::attributes::Attributes;
use crate::client::Client;
use crate::events::event::EvaluationEvent;
use crate::events::sender::EventSender;
use crate::fetch::{Fetcher, NetworkError};
use crate::models::{Experiment, Parameter, Segment};
use crate::options::ClientOptions;

/// A [`Fetcher`] that always returns the same canned tables, for tests that
/// want a [`Client`] with a fixed, never-refreshing snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pub parameters: Vec<Parameter>,
    pub experiments: Vec<Experiment>,
    pub segments: Vec<Segment>,
}

impl Fetcher for StaticFetcher {
    fn fetch_parameters(&self) -> Result<Vec<Parameter>, NetworkError> {
        Ok(self.parameters.clone())
    }

    fn fetch_experiments(&self) -> Result<Vec<Experiment>, NetworkError> {
        Ok(self.experiments.clone())
    }

    fn fetch_segments(&self) -> Result<Vec<Segment>, NetworkError> {
        Ok(self.segments.clone())
    }
}

/// An [`EventSender`] that discards everything it is given. Used when a test
/// cares about evaluation results, not telemetry delivery.
#[derive(Debug, Default)]
pub struct DiscardingSender;

impl EventSender for DiscardingSender {
    fn send(&self, _events: Vec<EvaluationEvent>) -> Result<(), NetworkError> {
        Ok(())
    }
}

/// Builds and starts a [`Client`] serving `parameters`/`experiments` from a
/// [`StaticFetcher`], with a [`DiscardingSender`] standing in for telemetry
/// delivery. The returned client is already started; call [`Client::stop`]
/// when the test is done with it.
pub fn offline_client(parameters: Vec<Parameter>, experiments: Vec<Experiment>) -> Client {
    let fetcher = Arc::new(StaticFetcher {
        parameters,
        experiments,
        segments: Vec::new(),
    });
    let options = ClientOptions::builder("https://test.invalid")
        .build()
        .expect("a non-empty literal endpoint always builds");
    let client = Client::with_collaborators(options, fetcher, Arc::new(DiscardingSender));
    client.start().expect("starting against a StaticFetcher never fails");
    client
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;

    #[test]
    fn offline_client_serves_canned_parameters() {
        let client = offline_client(
            vec![Parameter {
                name: "greeting".into(),
                data_type: DataType::String,
                default_value: "hi".into(),
                rules: Vec::new(),
            }],
            Vec::new(),
        );
        let value = client.evaluate_parameter("greeting", &Attributes::new());
        assert_eq!(value.as_string("fallback"), "hi");
        client.stop().unwrap();
    }
}