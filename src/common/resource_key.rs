// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use k8s_openapi::api::networking::v1::Ingress;
use kube::{Resource, ResourceExt};

pub const DEFAULT_GROUP_NAME: &str = "networking.k8s.io";
pub const DEFAULT_NAMESPACE_NAME: &str = "default";
pub const DEFAULT_KIND_NAME: &str = "Ingress";

/// Identity of a source object observed through the mirror.
///
/// Field order matters: the derived `Ord` sorts by namespace, then name, which is the
/// order in which contributions to a shared config object are merged.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub group: String,
    pub namespace: String,
    pub name: String,
    pub kind: String,
}

impl ResourceKey {
    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self { name: name.to_owned(), namespace: namespace.to_owned(), ..Default::default() }
    }
}

impl Default for ResourceKey {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP_NAME.to_owned(),
            namespace: DEFAULT_NAMESPACE_NAME.to_owned(),
            name: String::default(),
            kind: DEFAULT_KIND_NAME.to_owned(),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", create_id(&self.name, &self.namespace))
    }
}

fn create_id(name: &str, namespace: &str) -> String {
    namespace.to_owned() + "." + name
}

impl From<&Ingress> for ResourceKey {
    fn from(value: &Ingress) -> Self {
        Self { group: DEFAULT_GROUP_NAME.to_owned(), namespace: ingress_namespace(value), name: value.name_any(), kind: DEFAULT_KIND_NAME.to_owned() }
    }
}

/// Namespace an ingress lives in. Objects read without one belong to `default`.
pub fn ingress_namespace(ingress: &Ingress) -> String {
    ingress.meta().namespace.clone().unwrap_or_else(|| DEFAULT_NAMESPACE_NAME.to_owned())
}
