// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use super::{
    handlers::{check_ingress_spec_changed, ResourceState, ResourceStateChecker},
    ControllerOptions,
};
use crate::{
    common::{ingress_namespace, ConfigKey, ConfigObject, ResourceKey, INGRESS_CLASS_ANNOTATION},
    state::ConfigSnapshot,
    translator::{self, TranslatorOptions},
};

const TARGET: &str = "kubvernor_ingress::controllers::reconciler";

pub(crate) type ConfigChanges = BTreeMap<ConfigKey, Option<Arc<ConfigObject>>>;

/// Result of folding one ingress event into the derived state.
#[derive(Debug, Default)]
pub(crate) struct Reconciled {
    pub changes: ConfigChanges,
    pub skipped: usize,
    pub rejected: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Rebuilt {
    pub configs: ConfigSnapshot,
    pub skipped: usize,
    pub rejected: usize,
}

/// Tracks which ingress contributed what to every derived object.
///
/// Each ingress owns its translation. A derived object is the merge of the contributions
/// stored under its key, taken in [`ResourceKey`] order, and disappears with its last contributor.
pub(crate) struct Reconciler {
    watched_namespace: String,
    ingress_class: String,
    translator: TranslatorOptions,
    ingresses: BTreeMap<ResourceKey, Arc<Ingress>>,
    contributions: BTreeMap<ConfigKey, BTreeMap<ResourceKey, ConfigObject>>,
    owned: BTreeMap<ResourceKey, BTreeSet<ConfigKey>>,
}

impl Reconciler {
    pub fn new(options: &ControllerOptions) -> Self {
        Self {
            watched_namespace: options.watched_namespace.clone(),
            ingress_class: options.ingress_class.clone(),
            translator: options.translator_options(),
            ingresses: BTreeMap::new(),
            contributions: BTreeMap::new(),
            owned: BTreeMap::new(),
        }
    }

    pub fn on_apply(&mut self, ingress: &Arc<Ingress>) -> Reconciled {
        let key = ResourceKey::from(&**ingress);
        if !self.in_scope(ingress) {
            debug!(target: TARGET, "Ignoring {key} outside of namespace {}", self.watched_namespace);
            return Reconciled::default();
        }
        if !self.matches_class(ingress) {
            debug!(target: TARGET, "Ignoring {key} not of class {}", self.ingress_class);
            return self.on_delete(&key);
        }

        match ResourceStateChecker::check_status(ingress, self.ingresses.get(&key), check_ingress_spec_changed) {
            ResourceState::VersionNotChanged => {
                debug!(target: TARGET, "{key} version not changed");
                return Reconciled::default();
            },
            ResourceState::SpecNotChanged => {
                debug!(target: TARGET, "{key} spec not changed");
                self.ingresses.insert(key, Arc::clone(ingress));
                return Reconciled::default();
            },
            ResourceState::New | ResourceState::SpecChanged => {},
        }

        self.ingresses.insert(key.clone(), Arc::clone(ingress));
        let (configs, skipped, rejected) = self.translate(&key, ingress);
        let touched = self.replace_contributions(&key, configs);
        Reconciled { changes: self.changes(touched), skipped, rejected }
    }

    pub fn on_delete(&mut self, key: &ResourceKey) -> Reconciled {
        if self.ingresses.remove(key).is_none() && !self.owned.contains_key(key) {
            return Reconciled::default();
        }
        debug!(target: TARGET, "Removing contributions of {key}");
        let touched = self.replace_contributions(key, vec![]);
        Reconciled { changes: self.changes(touched), ..Default::default() }
    }

    /// Forgets everything and derives the full set again from `ingresses`.
    pub fn rebuild(&mut self, ingresses: Vec<Arc<Ingress>>) -> Rebuilt {
        self.ingresses.clear();
        self.contributions.clear();
        self.owned.clear();

        let mut rebuilt = Rebuilt::default();
        for ingress in ingresses {
            if !self.in_scope(&ingress) || !self.matches_class(&ingress) {
                continue;
            }
            let key = ResourceKey::from(&*ingress);
            let (configs, skipped, rejected) = self.translate(&key, &ingress);
            rebuilt.skipped += skipped;
            rebuilt.rejected += usize::from(rejected);
            self.replace_contributions(&key, configs);
            self.ingresses.insert(key, ingress);
        }

        rebuilt.configs = self.contributions.keys().filter_map(|key| self.merged(key).map(|config| (key.clone(), Arc::new(config)))).collect();
        info!(target: TARGET, "Rebuilt {} config objects from {} ingresses", rebuilt.configs.len(), self.ingresses.len());
        rebuilt
    }

    pub fn merged(&self, key: &ConfigKey) -> Option<ConfigObject> {
        let mut contributions = self.contributions.get(key)?.values();
        let mut merged = contributions.next()?.clone();
        for contribution in contributions {
            merged.merge(contribution);
        }
        Some(merged)
    }

    pub fn owned_by(&self, key: &ResourceKey) -> Option<&BTreeSet<ConfigKey>> {
        self.owned.get(key)
    }

    fn in_scope(&self, ingress: &Ingress) -> bool {
        self.watched_namespace.is_empty() || ingress_namespace(ingress) == self.watched_namespace
    }

    fn matches_class(&self, ingress: &Ingress) -> bool {
        let class = ingress
            .annotations()
            .get(INGRESS_CLASS_ANNOTATION)
            .or_else(|| ingress.spec.as_ref().and_then(|spec| spec.ingress_class_name.as_ref()));
        class.is_none_or(|class| *class == self.ingress_class)
    }

    fn translate(&self, key: &ResourceKey, ingress: &Ingress) -> (Vec<ConfigObject>, usize, bool) {
        match translator::translate(ingress, &self.translator) {
            Ok(translation) => {
                for error in &translation.skipped {
                    warn!(target: TARGET, "Skipped fragment of {key}: {error}");
                }
                (translation.configs, translation.skipped.len(), false)
            },
            Err(e) => {
                warn!(target: TARGET, "Rejected {key}: {e}");
                (vec![], 0, true)
            },
        }
    }

    /// Swaps the contributions of `source` for `configs`. Returns every key whose merge may have changed.
    fn replace_contributions(&mut self, source: &ResourceKey, configs: Vec<ConfigObject>) -> BTreeSet<ConfigKey> {
        let previous = self.owned.remove(source).unwrap_or_default();
        for key in &previous {
            if let Some(contributors) = self.contributions.get_mut(key) {
                contributors.remove(source);
                if contributors.is_empty() {
                    self.contributions.remove(key);
                }
            }
        }

        let mut current = BTreeSet::new();
        for config in configs {
            let key = config.key();
            current.insert(key.clone());
            self.contributions.entry(key).or_default().insert(source.clone(), config);
        }
        if !current.is_empty() {
            self.owned.insert(source.clone(), current.clone());
        }

        previous.into_iter().chain(current).collect()
    }

    fn changes(&self, touched: BTreeSet<ConfigKey>) -> ConfigChanges {
        touched
            .into_iter()
            .map(|key| {
                let merged = self.merged(&key).map(Arc::new);
                (key, merged)
            })
            .collect()
    }
}
