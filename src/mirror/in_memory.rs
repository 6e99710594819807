// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{stream::BoxStream, StreamExt};
use k8s_openapi::api::networking::v1::Ingress;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{IngressMirror, MirrorEvent};
use crate::common::ResourceKey;

#[derive(Default)]
struct Inner {
    ingresses: BTreeMap<ResourceKey, Arc<Ingress>>,
    subscribers: Vec<mpsc::UnboundedSender<MirrorEvent>>,
}

impl Inner {
    fn publish(&mut self, event: &MirrorEvent) {
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

/// Mirror fed by hand. Used to drive the controller without an API server.
#[derive(Clone, Default)]
pub struct InMemoryIngressMirror {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryIngressMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces an ingress and notifies subscribers.
    pub fn apply(&self, ingress: Ingress) -> Arc<Ingress> {
        let ingress = Arc::new(ingress);
        let mut inner = self.lock();
        let event = match inner.ingresses.insert(ResourceKey::from(&*ingress), Arc::clone(&ingress)) {
            Some(old) => MirrorEvent::Updated { old, new: Arc::clone(&ingress) },
            None => MirrorEvent::Added(Arc::clone(&ingress)),
        };
        inner.publish(&event);
        ingress
    }

    pub fn delete(&self, name: &str, namespace: &str) -> Option<Arc<Ingress>> {
        let mut inner = self.lock();
        let removed = inner.ingresses.remove(&ResourceKey::namespaced(name, namespace));
        if let Some(ingress) = &removed {
            inner.publish(&MirrorEvent::Deleted(Arc::clone(ingress)));
        }
        removed
    }

    /// Replaces the content without sending per-object events, as if they had been missed.
    pub fn replace_silently(&self, ingresses: Vec<Ingress>) {
        let mut inner = self.lock();
        inner.ingresses = ingresses.into_iter().map(|i| (ResourceKey::from(&i), Arc::new(i))).collect();
    }

    /// Re-sends an event verbatim, e.g. to simulate duplicate delivery.
    pub fn redeliver(&self, event: &MirrorEvent) {
        self.lock().publish(event);
    }

    pub fn resync(&self) {
        self.lock().publish(&MirrorEvent::Resync);
    }

    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|subscriber| !subscriber.is_closed());
        inner.subscribers.len()
    }
}

impl IngressMirror for InMemoryIngressMirror {
    fn snapshot(&self) -> Vec<Arc<Ingress>> {
        self.lock().ingresses.values().cloned().collect()
    }

    fn subscribe(&self) -> BoxStream<'static, MirrorEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // the content is already complete, so the initial list is done right away
        let _ = sender.send(MirrorEvent::Resync);
        self.lock().subscribers.push(sender);
        UnboundedReceiverStream::new(receiver).boxed()
    }
}
