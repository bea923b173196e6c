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

use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::fetch::Fetcher;
use crate::snapshot::SnapshotStore;
use crate::utils::ThreadHandle;

/// Periodically refreshes a [`SnapshotStore`] from a [`Fetcher`].
///
/// `start` performs one synchronous refresh on the caller's thread (errors
/// are logged but do not prevent startup), then spawns one background
/// worker: a single `recv_timeout`-driven loop that folds the
/// tick-or-terminate decision into one channel read, so a slow refresh
/// naturally coalesces the next tick instead of queueing a catch-up burst.
pub(crate) struct RefreshDispatcher {
    worker: Option<ThreadHandle<()>>,
}

impl RefreshDispatcher {
    /// Runs one refresh synchronously, then spawns the background worker.
    pub(crate) fn start(fetcher: Arc<dyn Fetcher>, snapshot: Arc<SnapshotStore>, interval: Duration) -> Self {
        refresh_once(&*fetcher, &snapshot);

        log::debug!("starting refresh dispatcher thread, interval={interval:?}");
        let worker = ThreadHandle::new(move |terminator| {
            let mut last_refresh_duration = Duration::ZERO;
            loop {
                let wait = interval.saturating_sub(last_refresh_duration);
                match terminator.recv_timeout(wait) {
                    Ok(()) => return,
                    Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {
                        let started = Instant::now();
                        refresh_once(&*fetcher, &snapshot);
                        last_refresh_duration = started.elapsed();
                    }
                }
            }
        });

        RefreshDispatcher { worker: Some(worker) }
    }

    /// Signals the worker to exit. Dropping the [`ThreadHandle`] drops its
    /// termination sender, which wakes the worker's `recv_timeout` with
    /// `Disconnected` immediately (channel disconnection is detected without
    /// waiting out the timeout) so it exits promptly. Idempotent: a second
    /// call finds `worker` already taken and is a no-op.
    pub(crate) fn stop(&mut self) {
        self.worker.take();
    }
}

impl Drop for RefreshDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Two-step refresh: segments first (best-effort — a failed
/// segment fetch just means newly referenced segments stay unresolved this
/// cycle), then experiments (abort on error, keeping the current snapshot),
/// then parameters (abort on error; the index already refreshed in the
/// experiments step still refers to experiment names that exist, so lookups
/// remain well-defined even if this step fails).
fn refresh_once(fetcher: &dyn Fetcher, snapshot: &SnapshotStore) {
    log::debug!("refresh cycle starting");
    match fetcher.fetch_segments() {
        Ok(segments) => {
            if let Err(error) = snapshot.put_segments(segments) {
                log::warn!("failed to persist segments: {error}");
            }
        }
        Err(error) => log::warn!("segment refresh failed, keeping previous segment table: {error}"),
    }

    let experiments = match fetcher.fetch_experiments() {
        Ok(experiments) => experiments,
        Err(error) => {
            log::warn!("experiment refresh failed, keeping previous snapshot: {error}");
            return;
        }
    };
    if let Err(error) = snapshot.put_experiments(experiments) {
        log::warn!("failed to persist experiments: {error}");
        return;
    }

    let parameters = match fetcher.fetch_parameters() {
        Ok(parameters) => parameters,
        Err(error) => {
            log::warn!("parameter refresh failed, keeping previous snapshot: {error}");
            return;
        }
    };
    if let Err(error) = snapshot.put_parameters(parameters) {
        log::warn!("failed to persist parameters: {error}");
    }
}
