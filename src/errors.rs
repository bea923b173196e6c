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

use std::sync::PoisonError;

use thiserror::Error;

use crate::fetch::NetworkError;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the evaluation core.
///
/// Condition-level type mismatches during evaluation never surface here —
/// they degrade to "condition does not match" and evaluation proceeds (see
/// [`crate::evaluation::condition`]). `ParameterNotFound` is the only error
/// an evaluation call can hand back to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested parameter isn't present in the current snapshot, and no
    /// experiment assigns it either.
    #[error("parameter '{0}' not found")]
    ParameterNotFound(String),

    /// Reserved for future use: evaluation never produces this today since
    /// attribute type mismatches degrade silently to a non-match.
    #[error("invalid attribute '{0}'")]
    InvalidAttribute(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("cannot acquire snapshot lock")]
    CannotAcquireLock,
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_value: PoisonError<T>) -> Self {
        Error::CannotAcquireLock
    }
}

/// Failures from an (optional) embedded persistence backend. The evaluation
/// core never depends on persistence for correctness; see
/// [`crate::persistence::PersistenceStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read key '{key}'")]
    ReadFailed { key: String },

    #[error("failed to write key '{key}'")]
    WriteFailed { key: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Invalid construction-time options passed to [`crate::client::ClientOptions`].
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("endpoint_url must not be empty")]
    MissingEndpointUrl,

    #[error("flush_size ({flush_size}) must not exceed max_size ({max_size})")]
    FlushSizeExceedsMaxSize { flush_size: usize, max_size: usize },

    #[error("flush_bytes ({flush_bytes}) must not exceed max_bytes ({max_bytes})")]
    FlushBytesExceedsMaxBytes {
        flush_bytes: usize,
        max_bytes: usize,
    },

    #[error("cannot parse '{0}' as a URL")]
    InvalidUrl(String),
}