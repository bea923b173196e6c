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

use crate::events::event::EvaluationEvent;
use crate::fetch::NetworkError;

/// Delivers a flushed batch of events upstream. Invoked by the batcher's
/// flush path without holding the buffer's mutex, so a slow or blocking
/// sender never stalls concurrent `track_event` callers.
pub trait EventSender: Send + Sync {
    fn send(&self, events: Vec<EvaluationEvent>) -> Result<(), NetworkError>;
}