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

use thiserror::Error;

use crate::models::experiment::Experiment;
use crate::models::parameter::Parameter;
use crate::models::segment::Segment;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("failed to decode response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Retrieves the current parameter/experiment/segment lists from an
/// upstream source. Concrete transport (HTTP, object storage) is an
/// external collaborator; [`crate::network::http_fetcher::HttpFetcher`] is
/// the bundled HTTP implementation.
pub trait Fetcher: Send + Sync {
    fn fetch_parameters(&self) -> Result<Vec<Parameter>, NetworkError>;
    fn fetch_experiments(&self) -> Result<Vec<Experiment>, NetworkError>;
    fn fetch_segments(&self) -> Result<Vec<Segment>, NetworkError>;
}