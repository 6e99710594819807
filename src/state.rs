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
    sync::{Arc, RwLock},
};

use tracing::warn;

use crate::common::{ConfigEvent, ConfigKey, ConfigKind, ConfigObject};

const TARGET: &str = "kubvernor_ingress::state";

#[derive(thiserror::Error, Debug, PartialEq, PartialOrd)]
pub enum StorageError {
    LockingError,
}
impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

pub type ConfigSnapshot = BTreeMap<ConfigKey, Arc<ConfigObject>>;

/// Read side of the derived configuration.
pub trait ConfigStore {
    /// Exact lookup. A miss is `None`, never an error.
    fn get(&self, kind: ConfigKind, name: &str, namespace: &str) -> Option<Arc<ConfigObject>>;

    /// All objects of `kind` in `namespace`, or in every namespace when `namespace` is empty.
    fn list(&self, kind: ConfigKind, namespace: &str) -> Vec<Arc<ConfigObject>>;
}

/// Copy-on-write store of derived config objects.
///
/// Readers take the current snapshot and never block on a writer for longer than the
/// pointer swap. Writers build the next snapshot aside and publish it in one step, so a
/// reader sees either all of a change set or none of it.
#[derive(Clone, Default)]
pub struct ConfigCache {
    snapshot: Arc<RwLock<Arc<ConfigSnapshot>>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self { snapshot: Arc::new(RwLock::new(Arc::new(BTreeMap::new()))) }
    }

    pub fn snapshot(&self) -> Result<Arc<ConfigSnapshot>, StorageError> {
        let lock = self.snapshot.read().map_err(|_| StorageError::LockingError)?;
        Ok(Arc::clone(&lock))
    }

    pub fn get_config(&self, key: &ConfigKey) -> Result<Option<Arc<ConfigObject>>, StorageError> {
        Ok(self.snapshot()?.get(key).cloned())
    }

    pub fn list_configs(&self, kind: ConfigKind, namespace: &str) -> Result<Vec<Arc<ConfigObject>>, StorageError> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|(key, _)| key.kind == kind && (namespace.is_empty() || key.namespace == namespace))
            .map(|(_, config)| Arc::clone(config))
            .collect())
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.snapshot()?.is_empty())
    }

    /// Applies a change set: `Some` upserts, `None` removes. Entries equal to what is
    /// already stored are left untouched and produce no event.
    pub(crate) fn apply(&self, changes: BTreeMap<ConfigKey, Option<Arc<ConfigObject>>>) -> Result<Vec<ConfigEvent>, StorageError> {
        let current = self.snapshot()?;
        let mut next: Option<ConfigSnapshot> = None;
        let mut events = vec![];

        for (key, change) in changes {
            let existing = current.get(&key);
            let event = match (existing, change) {
                (None, None) => None,
                (Some(old), None) => {
                    next.get_or_insert_with(|| (*current).clone()).remove(&key);
                    Some(ConfigEvent::Deleted(Arc::clone(old)))
                },
                (Some(old), Some(new)) if **old == *new => None,
                (Some(old), Some(new)) => {
                    next.get_or_insert_with(|| (*current).clone()).insert(key, Arc::clone(&new));
                    Some(ConfigEvent::Updated { old: Arc::clone(old), new })
                },
                (None, Some(new)) => {
                    next.get_or_insert_with(|| (*current).clone()).insert(key, Arc::clone(&new));
                    Some(ConfigEvent::Added(new))
                },
            };
            events.extend(event);
        }

        if let Some(next) = next {
            self.publish(next)?;
        }
        Ok(events)
    }

    /// Replaces the whole content with `configs`, keeping the stored instance of every
    /// object that did not change.
    pub(crate) fn replace_all(&self, configs: ConfigSnapshot) -> Result<Vec<ConfigEvent>, StorageError> {
        let current = self.snapshot()?;
        let mut events = vec![];
        let mut next = ConfigSnapshot::new();

        for (key, new) in configs {
            match current.get(&key) {
                Some(old) if *old == new => {
                    next.insert(key, Arc::clone(old));
                },
                Some(old) => {
                    events.push(ConfigEvent::Updated { old: Arc::clone(old), new: Arc::clone(&new) });
                    next.insert(key, new);
                },
                None => {
                    events.push(ConfigEvent::Added(Arc::clone(&new)));
                    next.insert(key, new);
                },
            }
        }
        for (key, old) in current.iter() {
            if !next.contains_key(key) {
                events.push(ConfigEvent::Deleted(Arc::clone(old)));
            }
        }

        if !events.is_empty() {
            self.publish(next)?;
        }
        Ok(events)
    }

    fn publish(&self, next: ConfigSnapshot) -> Result<(), StorageError> {
        let mut lock = self.snapshot.write().map_err(|_| StorageError::LockingError)?;
        *lock = Arc::new(next);
        Ok(())
    }
}

impl ConfigStore for ConfigCache {
    fn get(&self, kind: ConfigKind, name: &str, namespace: &str) -> Option<Arc<ConfigObject>> {
        self.get_config(&ConfigKey::new(kind, name, namespace)).unwrap_or_else(|e| {
            warn!(target: TARGET, "get {kind} {namespace}.{name} failed {e}");
            None
        })
    }

    fn list(&self, kind: ConfigKind, namespace: &str) -> Vec<Arc<ConfigObject>> {
        self.list_configs(kind, namespace).unwrap_or_else(|e| {
            warn!(target: TARGET, "list {kind} {namespace} failed {e}");
            vec![]
        })
    }
}
