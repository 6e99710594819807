// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use atomic_take::AtomicTake;
use futures::StreamExt;
use tokio::{
    sync::{broadcast, watch},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{
    reconciler::{Reconciled, Reconciler},
    ConfigStoreCache, ConstructionError, ControllerError, ControllerOptions,
};
use crate::{
    common::{ConfigEvent, ConfigKind, ConfigObject, ResourceKey},
    mirror::{IngressMirror, MirrorEvent},
    state::{ConfigCache, ConfigStore},
};

const TARGET: &str = "kubvernor_ingress::controllers::ingress";
const CONFIG_EVENTS_CAPACITY: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the first complete list of ingresses.
    Initializing,
    Synced,
    Reconciling,
    Resyncing,
}

#[derive(Debug, Default)]
pub struct ReconcileStats {
    events: AtomicU64,
    resyncs: AtomicU64,
    rejected: AtomicU64,
    skipped_fragments: AtomicU64,
}

impl ReconcileStats {
    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    pub fn resyncs(&self) -> u64 {
        self.resyncs.load(Ordering::Relaxed)
    }

    /// Ingresses that produced no config because translation failed.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn skipped_fragments(&self) -> u64 {
        self.skipped_fragments.load(Ordering::Relaxed)
    }

    fn record(&self, skipped: usize, rejected: usize) {
        self.skipped_fragments.fetch_add(skipped as u64, Ordering::Relaxed);
        self.rejected.fetch_add(rejected as u64, Ordering::Relaxed);
    }
}

/// Derives mesh config from ingresses and serves it to readers.
///
/// All writes happen inside [`IngressController::run`], one mirror event or resync at a
/// time. Reads go straight to the [`ConfigCache`] and can come from any thread.
pub struct IngressController {
    options: ControllerOptions,
    cache: ConfigCache,
    events: broadcast::Sender<ConfigEvent>,
    state: watch::Sender<ControllerState>,
    stats: Arc<ReconcileStats>,
    reconciler: AtomicTake<Reconciler>,
}

impl IngressController {
    pub fn new(options: ControllerOptions, cache: ConfigCache) -> Result<Self, ConstructionError> {
        options.validate()?;
        let (events, _) = broadcast::channel(CONFIG_EVENTS_CAPACITY);
        let (state, _) = watch::channel(ControllerState::Initializing);
        let reconciler = AtomicTake::new(Reconciler::new(&options));
        Ok(Self { options, cache, events, state, stats: Arc::new(ReconcileStats::default()), reconciler })
    }

    /// Consumes the mirror until `shutdown` resolves or the mirror stream ends.
    ///
    /// The subscription is dropped on return and the cache keeps its last contents.
    pub async fn run<M, S>(&self, mirror: &M, shutdown: S) -> Result<(), ControllerError>
    where
        M: IngressMirror + ?Sized,
        S: Future<Output = ()>,
    {
        let Some(mut reconciler) = self.reconciler.take() else {
            return Err(ControllerError::AlreadyRunning);
        };

        let period = self.options.resync_period;
        let mut resync = time::interval_at(Instant::now() + period, period);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut mirror_events = mirror.subscribe();
        tokio::pin!(shutdown);

        info!(target: TARGET, "Ingress controller started namespace={:?} resync={period:?} mode={:?}", self.options.watched_namespace, self.options.mode);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(target: TARGET, "Ingress controller shutting down");
                    break;
                },
                event = mirror_events.next() => {
                    let Some(event) = event else {
                        info!(target: TARGET, "Ingress mirror stream ended");
                        break;
                    };
                    self.on_mirror_event(&mut reconciler, mirror, event);
                },
                _ = resync.tick(), if self.has_synced() => self.resync(&mut reconciler, mirror),
            }
        }
        Ok(())
    }

    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub async fn wait_for_sync(&self) {
        let mut state = self.state.subscribe();
        // the sender lives in self, so the channel cannot close while we wait
        let _ = state.wait_for(|state| *state != ControllerState::Initializing).await;
    }

    pub fn stats(&self) -> Arc<ReconcileStats> {
        Arc::clone(&self.stats)
    }

    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    fn on_mirror_event<M: IngressMirror + ?Sized>(&self, reconciler: &mut Reconciler, mirror: &M, event: MirrorEvent) {
        let reconciled = match event {
            MirrorEvent::Added(ingress) | MirrorEvent::Updated { new: ingress, .. } => {
                debug!(target: TARGET, "Ingress applied {}", ResourceKey::from(&*ingress));
                self.reconcile(|| reconciler.on_apply(&ingress))
            },
            MirrorEvent::Deleted(ingress) => {
                let key = ResourceKey::from(&*ingress);
                debug!(target: TARGET, "Ingress deleted {key}");
                self.reconcile(|| reconciler.on_delete(&key))
            },
            MirrorEvent::Resync => {
                self.resync(reconciler, mirror);
                return;
            },
        };
        self.stats.events.fetch_add(1, Ordering::Relaxed);
        self.stats.record(reconciled.skipped, usize::from(reconciled.rejected));
    }

    fn reconcile(&self, reconcile: impl FnOnce() -> Reconciled) -> Reconciled {
        let synced = self.has_synced();
        if synced {
            self.state.send_replace(ControllerState::Reconciling);
        }
        let mut reconciled = reconcile();
        if !reconciled.changes.is_empty() {
            match self.cache.apply(std::mem::take(&mut reconciled.changes)) {
                Ok(events) => self.publish(events),
                Err(e) => warn!(target: TARGET, "Unable to update config cache {e}"),
            }
        }
        if synced {
            self.state.send_replace(ControllerState::Synced);
        }
        reconciled
    }

    fn resync<M: IngressMirror + ?Sized>(&self, reconciler: &mut Reconciler, mirror: &M) {
        self.state.send_replace(ControllerState::Resyncing);
        let rebuilt = reconciler.rebuild(mirror.snapshot());
        match self.cache.replace_all(rebuilt.configs) {
            Ok(events) => {
                self.publish(events);
                self.publish(vec![ConfigEvent::Resynced]);
            },
            Err(e) => warn!(target: TARGET, "Unable to replace config cache {e}"),
        }
        self.stats.resyncs.fetch_add(1, Ordering::Relaxed);
        self.stats.record(rebuilt.skipped, rebuilt.rejected);
        self.state.send_replace(ControllerState::Synced);
    }

    fn publish(&self, events: Vec<ConfigEvent>) {
        for event in events {
            debug!(target: TARGET, "Config event {event}");
            // no receivers is fine
            let _ = self.events.send(event);
        }
    }
}

impl ConfigStore for IngressController {
    fn get(&self, kind: ConfigKind, name: &str, namespace: &str) -> Option<Arc<ConfigObject>> {
        self.cache.get(kind, name, namespace)
    }

    fn list(&self, kind: ConfigKind, namespace: &str) -> Vec<Arc<ConfigObject>> {
        self.cache.list(kind, namespace)
    }
}

impl ConfigStoreCache for IngressController {
    fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.events.subscribe()
    }

    fn has_synced(&self) -> bool {
        self.state() != ControllerState::Initializing
    }
}
