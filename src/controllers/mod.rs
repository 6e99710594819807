// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Keeps the config cache in line with the mirrored ingresses.

mod handlers;
mod ingress;
mod reconciler;

use std::time::Duration;

pub use ingress::{ControllerState, IngressController, ReconcileStats};
use thiserror::Error;
use tokio::sync::broadcast;
use typed_builder::TypedBuilder;

use crate::{
    common::{ConfigEvent, DEFAULT_INGRESS_CLASS},
    state::ConfigStore,
    translator::TranslatorOptions,
};
pub use crate::translator::ControllerMode;

const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

#[derive(Error, Debug, PartialEq, PartialOrd)]
pub enum ControllerError {
    AlreadyRunning,
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Invalid options. The controller refuses to start.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("resync period must be greater than zero")]
    ZeroResyncPeriod,
    #[error("domain suffix must be not empty")]
    EmptyDomainSuffix,
    #[error("domain suffix {0} is not a valid DNS name")]
    InvalidDomainSuffix(String),
    #[error("watched namespace {0} is not a valid namespace name")]
    InvalidNamespace(String),
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct ControllerOptions {
    /// Empty watches every namespace.
    #[builder(default, setter(into))]
    pub watched_namespace: String,
    pub resync_period: Duration,
    #[builder(setter(into))]
    pub domain_suffix: String,
    #[builder(default)]
    pub mode: ControllerMode,
    #[builder(default = DEFAULT_INGRESS_CLASS.to_owned(), setter(into))]
    pub ingress_class: String,
}

impl ControllerOptions {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.resync_period.is_zero() {
            return Err(ConstructionError::ZeroResyncPeriod);
        }
        if self.domain_suffix.is_empty() {
            return Err(ConstructionError::EmptyDomainSuffix);
        }
        if !is_dns1123_subdomain(&self.domain_suffix) {
            return Err(ConstructionError::InvalidDomainSuffix(self.domain_suffix.clone()));
        }
        if !self.watched_namespace.is_empty() && !is_dns1123_label(&self.watched_namespace) {
            return Err(ConstructionError::InvalidNamespace(self.watched_namespace.clone()));
        }
        Ok(())
    }

    pub fn translator_options(&self) -> TranslatorOptions {
        TranslatorOptions::builder().domain_suffix(self.domain_suffix.clone()).mode(self.mode).build()
    }
}

/// Read API plus change notifications, for control-plane components downstream of the controller.
pub trait ConfigStoreCache: ConfigStore {
    fn subscribe(&self) -> broadcast::Receiver<ConfigEvent>;

    /// True once the first complete list of ingresses has been reflected in the store.
    fn has_synced(&self) -> bool;
}

fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= DNS1123_LABEL_MAX_LENGTH
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        },
        _ => false,
    }
}

fn is_dns1123_subdomain(value: &str) -> bool {
    value.len() <= DNS1123_SUBDOMAIN_MAX_LENGTH && value.split('.').all(is_dns1123_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ControllerOptions {
        ControllerOptions::builder().resync_period(Duration::from_secs(60)).domain_suffix("cluster.local").build()
    }

    #[test]
    fn defaults_are_valid() {
        let options = options();
        assert_eq!(options.validate(), Ok(()));
        assert_eq!(options.ingress_class, "istio");
        assert_eq!(options.mode, ControllerMode::Strict);
        assert!(options.watched_namespace.is_empty());
    }

    #[test]
    fn rejects_bad_options() {
        let mut zero = options();
        zero.resync_period = Duration::ZERO;
        assert_eq!(zero.validate(), Err(ConstructionError::ZeroResyncPeriod));

        let mut empty = options();
        empty.domain_suffix = String::new();
        assert_eq!(empty.validate(), Err(ConstructionError::EmptyDomainSuffix));

        for suffix in ["foo..com", "-foo.com", "Foo.com", "foo.com.", "foo_bar.com"] {
            let mut invalid = options();
            invalid.domain_suffix = suffix.to_owned();
            assert_eq!(invalid.validate(), Err(ConstructionError::InvalidDomainSuffix(suffix.to_owned())));
        }

        let mut namespace = options();
        namespace.watched_namespace = "kube.system".to_owned();
        assert_eq!(namespace.validate(), Err(ConstructionError::InvalidNamespace("kube.system".to_owned())));
    }

    #[test]
    fn accepts_dns_names() {
        assert!(is_dns1123_subdomain("foo.com"));
        assert!(is_dns1123_subdomain("svc-1.cluster.local"));
        assert!(is_dns1123_label("default"));
        assert!(!is_dns1123_label(&"a".repeat(64)));
    }
}
