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
use std::time::Duration;

use reqwest::blocking::Client;

use crate::fetch::{Fetcher, NetworkError};
use crate::models::experiment::Experiment;
use crate::models::parameter::Parameter;
use crate::models::segment::Segment;
use crate::network::wire::{into_experiment, into_parameter, ExperimentsResponse, ParametersResponse, SegmentsResponse};
use crate::snapshot::SnapshotStore;

/// Default [`Fetcher`] implementation: three `POST` endpoints against a
/// single upstream base URL, served by a blocking [`reqwest::blocking::Client`].
///
/// Segment references (`segmentId`) are resolved against whatever segment
/// table is currently held by `snapshot` — the refresh dispatcher fetches
/// and persists segments in the same cycle as experiments and parameters,
/// so a segment published this cycle is resolvable even though it changed
/// at the same moment as the rule referencing it.
pub struct HttpFetcher {
    endpoint: String,
    client: Client,
    snapshot: Arc<SnapshotStore>,
}

impl HttpFetcher {
    pub fn new(endpoint: impl Into<String>, snapshot: Arc<SnapshotStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client construction with only a timeout never fails");
        HttpFetcher {
            endpoint: endpoint.into(),
            client,
            snapshot,
        }
    }

    fn post_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let url = format!("{}{path}", self.endpoint);
        let response = self
            .client
            .post(&url)
            .send()
            .map_err(|source| NetworkError::Request { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(NetworkError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        response.json::<T>().map_err(|source| NetworkError::Decode { url, source })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_parameters(&self) -> Result<Vec<Parameter>, NetworkError> {
        let body: ParametersResponse = self.post_json("/api/v1/sdk/parameters")?;
        let resolve = |id: &str| self.snapshot.get_segment_by_id(id).ok().flatten();
        Ok(body.parameters.into_iter().map(|p| into_parameter(p, &resolve)).collect())
    }

    fn fetch_experiments(&self) -> Result<Vec<Experiment>, NetworkError> {
        let body: ExperimentsResponse = self.post_json("/api/v1/sdk/experiments")?;
        let resolve = |id: &str| self.snapshot.get_segment_by_id(id).ok().flatten();
        Ok(body.experiments.into_iter().map(|e| into_experiment(e, &resolve)).collect())
    }

    fn fetch_segments(&self) -> Result<Vec<Segment>, NetworkError> {
        let body: SegmentsResponse = self.post_json("/api/v1/sdk/segments")?;
        Ok(body.segments)
    }
}
