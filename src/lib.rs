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

//! Evaluation core for an A/B-testing and feature-flag client SDK.
//!
//! Given a parameter name and a bag of user attributes, [`Client::evaluate_parameter`]
//! returns a typed [`RolloutValue`] by consulting a set of running experiments
//! (stable hash-based bucketing) and a set of parameter rules (attribute or
//! segment matching) against a locally cached snapshot that [`Client::start`]
//! refreshes periodically from an upstream source.
//!
//! # Usage
//!
//! ```no_run
//! use rollout_evaluator::{Client, ClientOptions};
//! # use rollout_evaluator::Attributes;
//! # fn func() -> rollout_evaluator::Result<()> {
//! let options = ClientOptions::builder("https://rollout.example.com")
//!     .service_name("checkout")
//!     .build()?;
//! let client = Client::new(options)?;
//! client.start()?;
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("country".to_string(), "US".into());
//!
//! let value = client.evaluate_parameter("welcome_message", &attributes);
//! println!("welcome_message = {}", value.as_string("Hi"));
//!
//! client.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! Concrete transport to the upstream source (HTTP, object storage) and an
//! embedded key-value storage engine are external collaborators: this crate
//! ships a default blocking-HTTP [`Fetcher`]/[`EventSender`] pair that
//! [`Client::new`] wires in automatically, and a [`PersistenceStore`] trait
//! with no bundled implementation.

mod attributes;
mod client;
mod dispatcher;
mod errors;
mod evaluation;
mod events;
mod fetch;
mod models;
mod network;
mod options;
mod persistence;
mod snapshot;
mod utils;
mod value;

pub use attributes::{AttributeValue, Attributes};
pub use client::{Client, Metadata};
pub use errors::{ConfigurationError, Error, Result, StorageError};
pub use events::{BatcherConfig, EvaluationEvent, EventSender, EventType};
pub use fetch::{Fetcher, NetworkError};
pub use models::{
    AttributeDataType, Condition, DataType, Experiment, ExperimentSegmentGate, ExperimentStatus,
    Operator, Parameter, ParameterRule, RuleKind, Segment, SegmentRule, Variant, VariantParameter,
};
pub use options::{ClientOptions, ClientOptionsBuilder, EvaluationCallback, ValidityGate};
pub use persistence::PersistenceStore;
pub use value::RolloutValue;

#[cfg(feature = "test_utils")]
pub mod test_utils;