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

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::errors::Result;
use crate::models::experiment::Experiment;
use crate::models::parameter::Parameter;
use crate::models::segment::Segment;

/// The consistent triple a single evaluation observes: parameters by name,
/// experiments by name, and the parameter→experiments index built by
/// walking every variant's parameter list. Segments are carried alongside
/// but are not part of the triple proper — they change rarely and rules
/// only need them resolvable, not torn-read consistent with every refresh.
#[derive(Debug, Default)]
struct SnapshotData {
    parameters: HashMap<String, Arc<Parameter>>,
    experiments: HashMap<String, Arc<Experiment>>,
    parameter_to_experiments: HashMap<String, Vec<Arc<Experiment>>>,
    segments: HashMap<String, Arc<Segment>>,
}

/// Holds the current snapshot behind a read-write lock. Readers clone the
/// `Arc` under a brief read-lock; `put_parameters`/`put_experiments` build a
/// fresh `SnapshotData` off to the side and swap it in under a write-lock,
/// so a reader never observes a half-updated triple.
pub(crate) struct SnapshotStore {
    data: RwLock<Arc<SnapshotData>>,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        SnapshotStore {
            data: RwLock::new(Arc::new(SnapshotData::default())),
        }
    }

    /// Replaces the parameter table. The parameter→experiments index is left
    /// untouched; it is only ever rebuilt by [`Self::put_experiments`].
    pub(crate) fn put_parameters(&self, parameters: Vec<Parameter>) -> Result<()> {
        let current = self.current()?;
        let mut parameters_by_name = HashMap::with_capacity(parameters.len());
        for parameter in parameters {
            parameters_by_name.insert(parameter.name.clone(), Arc::new(parameter));
        }
        let next = SnapshotData {
            parameters: parameters_by_name,
            experiments: current.experiments.clone(),
            parameter_to_experiments: current.parameter_to_experiments.clone(),
            segments: current.segments.clone(),
        };
        self.swap(next)
    }

    /// Replaces the segment table. Segments referenced by already-resolved
    /// `Arc<Segment>` handles inside existing parameters/experiments keep
    /// pointing at the old segment content until those tables are
    /// themselves re-persisted with freshly resolved references.
    pub(crate) fn put_segments(&self, segments: Vec<Segment>) -> Result<()> {
        let current = self.current()?;
        let mut segments_by_id = HashMap::with_capacity(segments.len());
        for segment in segments {
            segments_by_id.insert(segment.id.clone(), Arc::new(segment));
        }
        let next = SnapshotData {
            parameters: current.parameters.clone(),
            experiments: current.experiments.clone(),
            parameter_to_experiments: current.parameter_to_experiments.clone(),
            segments: segments_by_id,
        };
        self.swap(next)
    }

    pub(crate) fn get_segment_by_id(&self, id: &str) -> Result<Option<Arc<Segment>>> {
        Ok(self.current()?.segments.get(id).cloned())
    }

    /// Replaces the experiment table and rebuilds the parameter→experiments
    /// index from scratch by walking every variant's parameter list.
    pub(crate) fn put_experiments(&self, experiments: Vec<Experiment>) -> Result<()> {
        let current = self.current()?;
        let mut experiments_by_name = HashMap::with_capacity(experiments.len());
        let mut index: HashMap<String, Vec<Arc<Experiment>>> = HashMap::new();

        for experiment in experiments {
            let experiment = Arc::new(experiment);
            let mut parameter_names: Vec<String> = experiment
                .variants
                .iter()
                .flat_map(|variant| variant.parameters.iter().map(|p| p.parameter_name.clone()))
                .collect();
            parameter_names.sort();
            parameter_names.dedup();
            for name in parameter_names {
                index.entry(name).or_default().push(Arc::clone(&experiment));
            }
            experiments_by_name.insert(experiment.name.clone(), experiment);
        }

        let next = SnapshotData {
            parameters: current.parameters.clone(),
            experiments: experiments_by_name,
            parameter_to_experiments: index,
            segments: current.segments.clone(),
        };
        self.swap(next)
    }

    pub(crate) fn get_parameter_by_name(&self, name: &str) -> Result<Option<Arc<Parameter>>> {
        Ok(self.current()?.parameters.get(name).cloned())
    }

    /// Empty is equivalent to "no experiments assign this parameter"; the
    /// façade treats it the same as a lookup miss.
    pub(crate) fn get_experiments_by_parameter_name(&self, name: &str) -> Result<Vec<Arc<Experiment>>> {
        Ok(self
            .current()?
            .parameter_to_experiments
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    pub(crate) fn close(&self) -> Result<()> {
        self.swap(SnapshotData::default())
    }

    fn current(&self) -> Result<Arc<SnapshotData>> {
        Ok(Arc::clone(&*self.data.read()?))
    }

    fn swap(&self, next: SnapshotData) -> Result<()> {
        let mut guard = self.data.write()?;
        *guard = Arc::new(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parameter::fixtures::parameter_no_rules;

    #[test]
    fn put_then_get_round_trips() {
        let store = SnapshotStore::new();
        store.put_parameters(vec![parameter_no_rules("greeting", "hi")]).unwrap();
        let found = store.get_parameter_by_name("greeting").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().default_value, "hi");
    }

    #[test]
    fn missing_parameter_returns_none_not_error() {
        let store = SnapshotStore::new();
        assert!(store.get_parameter_by_name("nope").unwrap().is_none());
    }

    #[test]
    fn put_parameters_does_not_clobber_experiment_index() {
        use crate::models::experiment::fixtures::fifty_fifty;
        let store = SnapshotStore::new();
        store.put_experiments(vec![fifty_fifty("uuid-1", "enableAuth")]).unwrap();
        store.put_parameters(vec![parameter_no_rules("greeting", "hi")]).unwrap();
        assert_eq!(store.get_experiments_by_parameter_name("enableAuth").unwrap().len(), 1);
    }

    #[test]
    fn close_clears_everything() {
        let store = SnapshotStore::new();
        store.put_parameters(vec![parameter_no_rules("greeting", "hi")]).unwrap();
        store.close().unwrap();
        assert!(store.get_parameter_by_name("greeting").unwrap().is_none());
    }
}