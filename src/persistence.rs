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

use crate::errors::StorageError;

/// Narrow interface to an optional embedded key-value store.
///
/// The evaluation core never depends on persistence for correctness — a
/// snapshot rebuilt entirely from [`crate::fetch::Fetcher`] responses is
/// always sufficient. An implementation is free to mirror the current
/// snapshot under the key layout below so a client can resume serving a
/// stale-but-valid snapshot before the first refresh completes, but the
/// concrete storage engine (e.g. an embedded LSM store) is an external
/// collaborator and out of scope for this crate.
///
/// Key layout, when used:
/// - `parameters:{name}` -> JSON-encoded `Parameter`
/// - `{experimentName}` -> JSON-encoded `Experiment`
/// - `experiments:parameters:{parameterName}` -> JSON array of experiment names
pub trait PersistenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn close(&self) -> Result<(), StorageError>;
}

pub(crate) fn parameter_key(name: &str) -> String {
    format!("parameters:{name}")
}

pub(crate) fn experiment_parameter_index_key(parameter_name: &str) -> String {
    format!("experiments:parameters:{parameter_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout_matches_documented_scheme() {
        assert_eq!(parameter_key("welcome_message"), "parameters:welcome_message");
        assert_eq!(
            experiment_parameter_index_key("enableAuth"),
            "experiments:parameters:enableAuth"
        );
    }
}