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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::attributes::{self, Attributes};
use crate::dispatcher::RefreshDispatcher;
use crate::errors::{Error, Result};
use crate::events::batcher::EventBatcher;
use crate::events::event::{EvaluationEvent, EventSource, EventType};
use crate::evaluation;
use crate::fetch::Fetcher;
use crate::network::{HttpEventSender, HttpFetcher};
use crate::options::ClientOptions;
use crate::snapshot::SnapshotStore;
use crate::value::RolloutValue;

/// The evaluation core's public façade: constructs a client against an
/// upstream endpoint, starts/stops the refresh dispatcher, and evaluates
/// parameters against the current snapshot.
///
/// Construction never blocks on network I/O; `start` performs the first
/// synchronous refresh and spawns the background worker; `stop` is
/// idempotent.
pub struct Client {
    options: ClientOptions,
    snapshot: Arc<SnapshotStore>,
    fetcher: Arc<dyn Fetcher>,
    batcher: Arc<EventBatcher>,
    dispatcher: Mutex<Option<RefreshDispatcher>>,
    event_counter: AtomicU64,
}

impl Client {
    /// Constructs a client. Never performs network I/O; call [`Self::start`]
    /// to perform the initial refresh and begin the background loop.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let snapshot = Arc::new(SnapshotStore::new());
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(options.endpoint_url.clone(), Arc::clone(&snapshot)));
        let sender = Arc::new(HttpEventSender::new(options.endpoint_url.clone()));
        let batcher = EventBatcher::new(options.batcher_config.clone(), sender);

        Ok(Client {
            options,
            snapshot,
            fetcher,
            batcher,
            dispatcher: Mutex::new(None),
            event_counter: AtomicU64::new(0),
        })
    }

    /// Constructs a client around caller-supplied [`Fetcher`]/[`crate::events::EventSender`]
    /// collaborators, bypassing the bundled HTTP implementations. Used by
    /// integration tests and by callers who supply their own transport.
    pub fn with_collaborators(
        options: ClientOptions,
        fetcher: Arc<dyn Fetcher>,
        sender: Arc<dyn crate::events::EventSender>,
    ) -> Self {
        let snapshot = Arc::new(SnapshotStore::new());
        let batcher = EventBatcher::new(options.batcher_config.clone(), sender);
        Client {
            options,
            snapshot,
            fetcher,
            batcher,
            dispatcher: Mutex::new(None),
            event_counter: AtomicU64::new(0),
        }
    }

    /// Performs one synchronous refresh, then spawns the background refresh
    /// worker. Calling `start` a second time is a no-op (logged) rather than
    /// spawning a duplicate worker.
    pub fn start(&self) -> Result<()> {
        let mut guard = self.dispatcher.lock()?;
        if guard.is_some() {
            log::warn!("start() called on an already-started client; ignoring");
            return Ok(());
        }
        *guard = Some(RefreshDispatcher::start(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.snapshot),
            self.options.refresh_interval,
        ));
        Ok(())
    }

    /// Idempotent: stops the refresh worker (if running), flushes and stops
    /// the event batcher, and releases the snapshot.
    pub fn stop(&self) -> Result<()> {
        if let Ok(mut guard) = self.dispatcher.lock() {
            if let Some(mut dispatcher) = guard.take() {
                dispatcher.stop();
            }
        }
        self.batcher.stop();
        self.snapshot.close()
    }

    /// `{ enableS3 }` passthrough from [`ClientOptions`].
    pub fn get_metadata(&self) -> Metadata {
        Metadata {
            enable_s3: self.options.enable_s3(),
        }
    }

    /// Evaluates `name` against `attributes`: experiments assigning the
    /// parameter are tried first (in index order), regardless of whether a
    /// standalone `Parameter` record by that name exists; then the
    /// parameter's own rules; then its default. Never panics. Only when
    /// neither an admitting experiment nor a `Parameter` record resolves the
    /// name does the result carry `ParameterNotFound`.
    pub fn evaluate_parameter(&self, name: &str, attributes: &Attributes) -> RolloutValue {
        let now = Utc::now();

        let experiments = match self.snapshot.get_experiments_by_parameter_name(name) {
            Ok(experiments) => experiments,
            Err(error) => return RolloutValue::from_error(error),
        };

        for experiment in experiments.iter() {
            let validity_gate = self.options.validity_gate();
            let matched = evaluation::experiment::evaluate_with_validity(experiment, attributes, name, |e| {
                match validity_gate {
                    Some(gate) => gate(e, now),
                    None => e.is_valid(now),
                }
            });
            if let Some(matched) = matched {
                let value = RolloutValue::new(matched.value.clone(), matched.data_type);
                self.track_experiment_event(name, attributes, now, &matched);
                return value;
            }
        }

        let parameter = match self.snapshot.get_parameter_by_name(name) {
            Ok(Some(parameter)) => parameter,
            Ok(None) => {
                let message = Error::ParameterNotFound(name.to_string()).to_string();
                self.track_event(name, attributes, now, EventSource::Parameter, None, Some(message));
                return RolloutValue::from_error(Error::ParameterNotFound(name.to_string()));
            }
            Err(error) => return RolloutValue::from_error(error),
        };

        let raw = evaluation::evaluate_parameter(&parameter, attributes);
        let value = RolloutValue::new(raw.clone(), parameter.data_type);
        self.track_event(name, attributes, now, EventSource::Parameter, Some(raw), None);
        value
    }

    fn track_experiment_event(
        &self,
        parameter_name: &str,
        attributes: &Attributes,
        now: chrono::DateTime<Utc>,
        matched: &evaluation::ExperimentMatch,
    ) {
        let event = EvaluationEvent {
            event_id: self.next_event_id(),
            service_name: self.options.service_name.clone(),
            event_type: EventType::ExperimentEvaluation,
            parameter_name: parameter_name.to_string(),
            source: EventSource::Experiment,
            attributes: attributes::snapshot(attributes),
            timestamp: now,
            rollout_value: Some(matched.value.clone()),
            data_type: Some(matched.data_type),
            error: None,
            experiment_id: Some(matched.experiment_id.clone()),
            variant_id: Some(matched.variant_id.clone()),
            variant_name: Some(matched.variant_name.clone()),
        };
        self.dispatch_event(event);
    }

    fn track_event(
        &self,
        parameter_name: &str,
        attributes: &Attributes,
        now: chrono::DateTime<Utc>,
        source: EventSource,
        rollout_value: Option<String>,
        error: Option<String>,
    ) {
        let event = EvaluationEvent {
            event_id: self.next_event_id(),
            service_name: self.options.service_name.clone(),
            event_type: EventType::ParameterEvaluation,
            parameter_name: parameter_name.to_string(),
            source,
            attributes: attributes::snapshot(attributes),
            timestamp: now,
            rollout_value,
            data_type: None,
            error,
            experiment_id: None,
            variant_id: None,
            variant_name: None,
        };
        self.dispatch_event(event);
    }

    fn dispatch_event(&self, event: EvaluationEvent) {
        if let Some(callback) = &self.options.on_evaluate {
            callback(&event);
        }
        self.batcher.track_event(event);
    }

    fn next_event_id(&self) -> String {
        let sequence = self.event_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:x}", Utc::now().timestamp_nanos_opt().unwrap_or_default(), sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub enable_s3: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSender;
    use crate::fetch::NetworkError;
    use crate::models::experiment::{fixtures::fifty_fifty, Experiment};
    use crate::models::parameter::{fixtures::parameter_no_rules, Parameter};
    use crate::models::segment::Segment;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    struct StaticFetcher {
        parameters: Vec<Parameter>,
        experiments: Vec<Experiment>,
    }

    impl Fetcher for StaticFetcher {
        fn fetch_parameters(&self) -> std::result::Result<Vec<Parameter>, NetworkError> {
            Ok(self.parameters.clone())
        }
        fn fetch_experiments(&self) -> std::result::Result<Vec<Experiment>, NetworkError> {
            Ok(self.experiments.clone())
        }
        fn fetch_segments(&self) -> std::result::Result<Vec<Segment>, NetworkError> {
            Ok(Vec::new())
        }
    }

    struct RecordingSender {
        events: StdMutex<Vec<EvaluationEvent>>,
        calls: AtomicUsize,
    }

    impl EventSender for RecordingSender {
        fn send(&self, events: Vec<EvaluationEvent>) -> std::result::Result<(), NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.events.lock().unwrap().extend(events);
            Ok(())
        }
    }

    fn test_client(fetcher: StaticFetcher) -> (Client, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender {
            events: StdMutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let options = ClientOptions::builder("https://example.com").build().unwrap();
        let client = Client::with_collaborators(options, Arc::new(fetcher), sender.clone());
        client.start().unwrap();
        (client, sender)
    }

    #[test]
    fn unknown_parameter_yields_parameter_not_found_s5() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: Vec::new(),
            experiments: Vec::new(),
        });
        let value = client.evaluate_parameter("missing", &Attributes::new());
        assert!(value.has_error());
        assert_eq!(value.as_string("x"), "x");
        client.stop().unwrap();
    }

    #[test]
    fn known_parameter_with_no_rules_returns_default() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: vec![parameter_no_rules("greeting", "hi")],
            experiments: Vec::new(),
        });
        let value = client.evaluate_parameter("greeting", &Attributes::new());
        assert!(!value.has_error());
        assert_eq!(value.as_string("fallback"), "hi");
        client.stop().unwrap();
    }

    #[test]
    fn experiment_resolution_precedes_parameter_rules() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: vec![parameter_no_rules("enableAuth", "false")],
            experiments: vec![fifty_fifty("uuid-precedence", "enableAuth")],
        });
        let mut attrs = Attributes::new();
        attrs.insert("user_id".to_string(), crate::attributes::AttributeValue::Number(1.0));
        let value = client.evaluate_parameter("enableAuth", &attrs);
        assert!(!value.has_error());
        assert!(value.as_bool(false) || !value.as_bool(true));
        client.stop().unwrap();
    }

    #[test]
    fn experiment_only_parameter_resolves_without_a_standalone_record() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: Vec::new(),
            experiments: vec![fifty_fifty("uuid-experiment-only", "enableAuth")],
        });
        let mut attrs = Attributes::new();
        attrs.insert("user_id".to_string(), crate::attributes::AttributeValue::Number(1.0));
        let value = client.evaluate_parameter("enableAuth", &attrs);
        assert!(!value.has_error(), "experiment-only parameter must not surface ParameterNotFound");
        client.stop().unwrap();
    }

    #[test]
    fn custom_validity_gate_overrides_the_default_status_and_date_window() {
        use crate::models::experiment::ExperimentStatus;

        let mut paused = fifty_fifty("uuid-custom-gate", "enableAuth");
        paused.status = ExperimentStatus::Paused;

        let sender = Arc::new(RecordingSender {
            events: StdMutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let options = ClientOptions::builder("https://example.com")
            .validity_gate(|_experiment, _now| true)
            .build()
            .unwrap();
        let client = Client::with_collaborators(
            options,
            Arc::new(StaticFetcher {
                parameters: Vec::new(),
                experiments: vec![paused],
            }),
            sender,
        );
        client.start().unwrap();

        let mut attrs = Attributes::new();
        attrs.insert("user_id".to_string(), crate::attributes::AttributeValue::Number(1.0));
        let value = client.evaluate_parameter("enableAuth", &attrs);
        assert!(!value.has_error(), "a permissive custom gate must admit a paused experiment");
        client.stop().unwrap();
    }

    #[test]
    fn start_is_idempotent_and_does_not_panic_on_second_call() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: Vec::new(),
            experiments: Vec::new(),
        });
        client.start().unwrap();
        client.stop().unwrap();
    }

    #[test]
    fn stop_is_idempotent() {
        let (client, _sender) = test_client(StaticFetcher {
            parameters: Vec::new(),
            experiments: Vec::new(),
        });
        client.stop().unwrap();
        client.stop().unwrap();
    }
}