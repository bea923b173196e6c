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

use chrono::{DateTime, Utc};
use log::LevelFilter;

use crate::errors::{ConfigurationError, Error};
use crate::events::event::EvaluationEvent;
use crate::events::BatcherConfig;
use crate::models::experiment::Experiment;

/// Evaluation callback invoked once per `evaluate_parameter` call, after the
/// rollout value has been decided and outside any snapshot or batcher lock.
pub type EvaluationCallback = Arc<dyn Fn(&EvaluationEvent) + Send + Sync>;

/// The experiment validity gate: given an experiment and the evaluation
/// instant, decides whether the experiment is eligible to admit anybody at
/// all. Defaults to [`Experiment::is_valid`] (`status == Running &&
/// start_date <= now <= end_date`); configurable via
/// [`ClientOptionsBuilder::validity_gate`] for callers that need a
/// different policy (e.g. ignoring `status` entirely, or a grace window).
pub type ValidityGate = Arc<dyn Fn(&Experiment, DateTime<Utc>) -> bool + Send + Sync>;

/// Construction-time options for a [`crate::client::Client`].
///
/// Built with [`ClientOptionsBuilder`]: one required field (`endpoint_url`),
/// the rest defaulted.
#[derive(Clone)]
pub struct ClientOptions {
    pub(crate) endpoint_url: String,
    pub(crate) s3_bucket_name: Option<String>,
    pub(crate) service_name: String,
    pub(crate) refresh_interval: Duration,
    pub(crate) in_memory_only: bool,
    pub(crate) storage_path: String,
    pub(crate) enable_remote_object_store: bool,
    pub(crate) log_level: LevelFilter,
    pub(crate) batcher_config: BatcherConfig,
    pub(crate) on_evaluate: Option<EvaluationCallback>,
    pub(crate) validity_gate: Option<ValidityGate>,
}

impl ClientOptions {
    pub fn builder(endpoint_url: impl Into<String>) -> ClientOptionsBuilder {
        ClientOptionsBuilder::new(endpoint_url)
    }

    /// Returns the configured validity gate, if any; `None` means "use
    /// [`Experiment::is_valid`]'s default policy".
    pub(crate) fn validity_gate(&self) -> Option<&ValidityGate> {
        self.validity_gate.as_ref()
    }

    pub fn enable_s3(&self) -> bool {
        self.enable_remote_object_store
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("endpoint_url", &self.endpoint_url)
            .field("s3_bucket_name", &self.s3_bucket_name)
            .field("service_name", &self.service_name)
            .field("refresh_interval", &self.refresh_interval)
            .field("in_memory_only", &self.in_memory_only)
            .field("storage_path", &self.storage_path)
            .field("enable_remote_object_store", &self.enable_remote_object_store)
            .field("log_level", &self.log_level)
            .field("batcher_config", &self.batcher_config)
            .field("on_evaluate", &self.on_evaluate.as_ref().map(|_| "Fn(..)"))
            .field("validity_gate", &self.validity_gate.as_ref().map(|_| "Fn(..)"))
            .finish()
    }
}

/// Builds a [`ClientOptions`], validating invariants that span multiple
/// fields (e.g. `flush_size <= max_size`) only at [`Self::build`].
pub struct ClientOptionsBuilder {
    endpoint_url: String,
    s3_bucket_name: Option<String>,
    service_name: String,
    refresh_interval: Duration,
    in_memory_only: bool,
    storage_path: String,
    enable_remote_object_store: bool,
    log_level: LevelFilter,
    batcher_config: BatcherConfig,
    on_evaluate: Option<EvaluationCallback>,
    validity_gate: Option<ValidityGate>,
}

impl ClientOptionsBuilder {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        ClientOptionsBuilder {
            endpoint_url: endpoint_url.into(),
            s3_bucket_name: None,
            service_name: String::new(),
            refresh_interval: Duration::from_secs(60),
            in_memory_only: false,
            storage_path: "/sdk-dump".to_string(),
            enable_remote_object_store: false,
            log_level: LevelFilter::Error,
            batcher_config: BatcherConfig::default(),
            on_evaluate: None,
            validity_gate: None,
        }
    }

    pub fn s3_bucket_name(mut self, name: impl Into<String>) -> Self {
        self.s3_bucket_name = Some(name.into());
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn in_memory_only(mut self, value: bool) -> Self {
        self.in_memory_only = value;
        self
    }

    pub fn storage_path(mut self, path: impl Into<String>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn enable_remote_object_store(mut self, value: bool) -> Self {
        self.enable_remote_object_store = value;
        self
    }

    pub fn log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn batcher_config(mut self, config: BatcherConfig) -> Self {
        self.batcher_config = config;
        self
    }

    pub fn on_evaluate<F>(mut self, callback: F) -> Self
    where
        F: Fn(&EvaluationEvent) + Send + Sync + 'static,
    {
        self.on_evaluate = Some(Arc::new(callback));
        self
    }

    /// Overrides the default experiment validity gate (`status == Running &&
    /// start_date <= now <= end_date`) with a caller-supplied policy.
    pub fn validity_gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&Experiment, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        self.validity_gate = Some(Arc::new(gate));
        self
    }

    pub fn build(self) -> Result<ClientOptions, Error> {
        if self.endpoint_url.trim().is_empty() {
            return Err(ConfigurationError::MissingEndpointUrl.into());
        }
        if url::Url::parse(&self.endpoint_url).is_err() {
            return Err(ConfigurationError::InvalidUrl(self.endpoint_url).into());
        }
        self.batcher_config.validate()?;

        Ok(ClientOptions {
            endpoint_url: self.endpoint_url,
            s3_bucket_name: self.s3_bucket_name,
            service_name: self.service_name,
            refresh_interval: self.refresh_interval,
            in_memory_only: self.in_memory_only,
            storage_path: self.storage_path,
            enable_remote_object_store: self.enable_remote_object_store,
            log_level: self.log_level,
            batcher_config: self.batcher_config,
            on_evaluate: self.on_evaluate,
            validity_gate: self.validity_gate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_endpoint_url_is_a_configuration_error() {
        let result = ClientOptionsBuilder::new("").build();
        assert!(matches!(result, Err(Error::Configuration(ConfigurationError::MissingEndpointUrl))));
    }

    #[test]
    fn defaults_match_spec() {
        let options = ClientOptionsBuilder::new("https://example.com").build().unwrap();
        assert_eq!(options.refresh_interval, Duration::from_secs(60));
        assert_eq!(options.storage_path, "/sdk-dump");
        assert!(!options.in_memory_only);
        assert!(!options.enable_s3());
    }

    #[test]
    fn malformed_endpoint_url_is_a_configuration_error() {
        let result = ClientOptionsBuilder::new("not a url").build();
        assert!(matches!(result, Err(Error::Configuration(ConfigurationError::InvalidUrl(_)))));
    }

    #[test]
    fn invalid_batcher_config_is_rejected() {
        let mut config = BatcherConfig::default();
        config.flush_size = config.max_size + 1;
        let result = ClientOptionsBuilder::new("https://example.com")
            .batcher_config(config)
            .build();
        assert!(result.is_err());
    }
}