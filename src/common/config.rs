// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use super::mesh::{GatewaySpec, VirtualServiceSpec};

pub const CONFIG_GROUP_NAME: &str = "networking.istio.io";
pub const CONFIG_VERSION: &str = "v1alpha3";

/// Kinds of config objects derived from ingresses. The set is closed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ConfigKind {
    Gateway,
    VirtualService,
}

impl ConfigKind {
    pub fn group(self) -> &'static str {
        CONFIG_GROUP_NAME
    }

    pub fn version(self) -> &'static str {
        CONFIG_VERSION
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKind::Gateway => "Gateway",
            ConfigKind::VirtualService => "VirtualService",
        }
    }
}

impl Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ConfigKey {
    pub kind: ConfigKind,
    pub namespace: String,
    pub name: String,
}

impl ConfigKey {
    pub fn new(kind: ConfigKind, name: &str, namespace: &str) -> Self {
        Self { kind, namespace: namespace.to_owned(), name: name.to_owned() }
    }
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.{}", self.kind, self.namespace, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMeta {
    #[serde(rename = "type")]
    pub kind: ConfigKind,
    pub group: String,
    pub version: String,
    pub name: String,
    pub namespace: String,
    pub domain: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSpec {
    Gateway(GatewaySpec),
    VirtualService(VirtualServiceSpec),
}

impl ConfigSpec {
    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigSpec::Gateway(_) => ConfigKind::Gateway,
            ConfigSpec::VirtualService(_) => ConfigKind::VirtualService,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigObject {
    pub meta: ConfigMeta,
    pub spec: ConfigSpec,
}

impl ConfigObject {
    /// The kind, group and version always follow the spec variant.
    pub fn new(name: &str, namespace: &str, domain: &str, spec: ConfigSpec) -> Self {
        let kind = spec.kind();
        Self {
            meta: ConfigMeta {
                kind,
                group: kind.group().to_owned(),
                version: kind.version().to_owned(),
                name: name.to_owned(),
                namespace: namespace.to_owned(),
                domain: domain.to_owned(),
            },
            spec,
        }
    }

    pub fn kind(&self) -> ConfigKind {
        self.meta.kind
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn namespace(&self) -> &str {
        &self.meta.namespace
    }

    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(self.meta.kind, &self.meta.name, &self.meta.namespace)
    }

    pub fn gateway(&self) -> Option<&GatewaySpec> {
        match &self.spec {
            ConfigSpec::Gateway(gateway) => Some(gateway),
            ConfigSpec::VirtualService(_) => None,
        }
    }

    pub fn virtual_service(&self) -> Option<&VirtualServiceSpec> {
        match &self.spec {
            ConfigSpec::VirtualService(virtual_service) => Some(virtual_service),
            ConfigSpec::Gateway(_) => None,
        }
    }

    /// Folds another contribution with the same identity into this object.
    pub fn merge(&mut self, other: &ConfigObject) {
        match (&mut self.spec, &other.spec) {
            (ConfigSpec::Gateway(this), ConfigSpec::Gateway(other)) => this.merge(other),
            (ConfigSpec::VirtualService(this), ConfigSpec::VirtualService(other)) => this.merge(other),
            (ConfigSpec::Gateway(_), ConfigSpec::VirtualService(_)) | (ConfigSpec::VirtualService(_), ConfigSpec::Gateway(_)) => {},
        }
    }
}

/// Change notification for derived config objects.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigEvent {
    Added(Arc<ConfigObject>),
    Updated { old: Arc<ConfigObject>, new: Arc<ConfigObject> },
    Deleted(Arc<ConfigObject>),
    Resynced,
}

impl ConfigEvent {
    pub fn key(&self) -> Option<ConfigKey> {
        match self {
            ConfigEvent::Added(config) | ConfigEvent::Updated { new: config, .. } | ConfigEvent::Deleted(config) => Some(config.key()),
            ConfigEvent::Resynced => None,
        }
    }
}

impl Display for ConfigEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigEvent::Added(config) => write!(f, "Added {}", config.key()),
            ConfigEvent::Updated { new, .. } => write!(f, "Updated {}", new.key()),
            ConfigEvent::Deleted(config) => write!(f, "Deleted {}", config.key()),
            ConfigEvent::Resynced => f.write_str("Resynced"),
        }
    }
}
