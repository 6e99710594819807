// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Local replica of the watched ingresses.
//!
//! The controller only depends on [`IngressMirror`]. Delivery, relisting and remote
//! timeouts are the mirror's business.

mod in_memory;
mod kube_mirror;

use std::sync::Arc;

use futures::stream::BoxStream;
pub use in_memory::InMemoryIngressMirror;
use k8s_openapi::api::networking::v1::Ingress;
pub use kube_mirror::KubeIngressMirror;

#[derive(Clone, Debug)]
pub enum MirrorEvent {
    Added(Arc<Ingress>),
    Updated { old: Arc<Ingress>, new: Arc<Ingress> },
    Deleted(Arc<Ingress>),
    /// The mirror holds a complete list again; derived state should be rebuilt from [`IngressMirror::snapshot`].
    Resync,
}

pub trait IngressMirror: Send + Sync {
    fn snapshot(&self) -> Vec<Arc<Ingress>>;

    /// Event stream for one consumer. The first `Resync` marks the end of the initial list.
    /// Dropping the stream releases the subscription.
    fn subscribe(&self) -> BoxStream<'static, MirrorEvent>;
}
