// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{collections::BTreeMap, sync::Arc};

use atomic_take::AtomicTake;
use futures::{future, stream::BoxStream, StreamExt};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    runtime::{
        reflector::{self, store::Writer, Store},
        watcher, WatchStreamExt,
    },
    Api, Client,
};
use tracing::{debug, info, warn};

use super::{IngressMirror, MirrorEvent};
use crate::common::{format_resource, ResourceKey};

const TARGET: &str = "kubvernor_ingress::mirror";

/// Mirror backed by a kube-runtime watcher feeding a reflector store.
pub struct KubeIngressMirror {
    api: Api<Ingress>,
    store: Store<Ingress>,
    writer: AtomicTake<Writer<Ingress>>,
}

impl KubeIngressMirror {
    /// `namespace` empty watches every namespace.
    pub fn new(client: Client, namespace: &str) -> Self {
        let api = if namespace.is_empty() { Api::all(client) } else { Api::namespaced(client, namespace) };
        let (store, writer) = reflector::store();
        info!(target: TARGET, "Mirroring {} in {}", format_resource::<Ingress>(), if namespace.is_empty() { "all namespaces" } else { namespace });
        Self { api, store, writer: AtomicTake::new(writer) }
    }
}

impl IngressMirror for KubeIngressMirror {
    fn snapshot(&self) -> Vec<Arc<Ingress>> {
        self.store.state()
    }

    /// The reflector has a single writer, so only the first subscriber gets events.
    fn subscribe(&self) -> BoxStream<'static, MirrorEvent> {
        let Some(writer) = self.writer.take() else {
            warn!(target: TARGET, "Ingress mirror already has a subscriber");
            return futures::stream::empty().boxed();
        };

        let mut tracker = EventTracker::default();
        watcher(self.api.clone(), watcher::Config::default())
            .default_backoff()
            .reflect(writer)
            .filter_map(move |event| {
                let event = match event {
                    Ok(event) => tracker.on_event(event),
                    Err(e) => {
                        warn!(target: TARGET, "Ingress watch failed {e:?}");
                        None
                    },
                };
                future::ready(event)
            })
            .boxed()
    }
}

/// Turns raw watch events into add/update/delete by remembering the last applied version of each ingress.
#[derive(Default)]
struct EventTracker {
    seen: BTreeMap<ResourceKey, Arc<Ingress>>,
    relisted: BTreeMap<ResourceKey, Arc<Ingress>>,
}

impl EventTracker {
    fn on_event(&mut self, event: watcher::Event<Ingress>) -> Option<MirrorEvent> {
        match event {
            watcher::Event::Apply(ingress) => {
                let ingress = Arc::new(ingress);
                let key = ResourceKey::from(&*ingress);
                debug!(target: TARGET, "Ingress applied {key}");
                match self.seen.insert(key, Arc::clone(&ingress)) {
                    Some(old) => Some(MirrorEvent::Updated { old, new: ingress }),
                    None => Some(MirrorEvent::Added(ingress)),
                }
            },
            watcher::Event::Delete(ingress) => {
                let key = ResourceKey::from(&ingress);
                debug!(target: TARGET, "Ingress deleted {key}");
                self.seen.remove(&key);
                Some(MirrorEvent::Deleted(Arc::new(ingress)))
            },
            watcher::Event::Init => {
                self.relisted.clear();
                None
            },
            watcher::Event::InitApply(ingress) => {
                self.relisted.insert(ResourceKey::from(&ingress), Arc::new(ingress));
                None
            },
            watcher::Event::InitDone => {
                self.seen = std::mem::take(&mut self.relisted);
                debug!(target: TARGET, "Ingress list complete {} objects", self.seen.len());
                Some(MirrorEvent::Resync)
            },
        }
    }
}
