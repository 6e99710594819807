// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Ingress to mesh config translation.
//!
//! [`translate`] is a pure function of its inputs: the same ingress and options always
//! produce the same config objects, in the same order.

mod gateway;
#[cfg(test)]
mod test;
mod virtual_service;

use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;
use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::common::ConfigObject;

/// How unsupported fragments of an ingress are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerMode {
    /// Any unsupported fragment rejects the whole ingress.
    #[default]
    Strict,
    /// Unsupported fragments are dropped and the rest is emitted.
    Permissive,
}

#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct TranslatorOptions {
    #[builder(setter(into))]
    pub domain_suffix: String,
    #[builder(default)]
    pub mode: ControllerMode,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TranslationError {
    #[error("ingress has no name")]
    MissingName,
    #[error("rule for host {host} has no HTTP paths")]
    MissingPaths { host: String },
    #[error("path {path} has unsupported path type {path_type}")]
    UnsupportedPathType { path: String, path_type: String },
    #[error("path {path} is not absolute")]
    InvalidPath { path: String },
    #[error("backend for path {path} does not reference a service")]
    MissingService { path: String },
    #[error("backend service {service} has no port")]
    MissingServicePort { service: String },
    #[error("tls entry {index} has no secret name")]
    MissingTlsSecret { index: usize },
}

/// Objects derived from one ingress, plus the fragments dropped in permissive mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translation {
    pub configs: Vec<ConfigObject>,
    pub skipped: Vec<TranslationError>,
}

struct FragmentCollector {
    mode: ControllerMode,
    skipped: Vec<TranslationError>,
}

impl FragmentCollector {
    fn new(mode: ControllerMode) -> Self {
        Self { mode, skipped: vec![] }
    }

    fn accept<T>(&mut self, fragment: Result<T, TranslationError>) -> Result<Option<T>, TranslationError> {
        match fragment {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self.mode {
                ControllerMode::Strict => Err(e),
                ControllerMode::Permissive => {
                    self.skipped.push(e);
                    Ok(None)
                },
            },
        }
    }
}

pub fn translate(ingress: &Ingress, options: &TranslatorOptions) -> Result<Translation, TranslationError> {
    if ingress.name_any().is_empty() {
        return Err(TranslationError::MissingName);
    }

    let mut collector = FragmentCollector::new(options.mode);
    let gateway = gateway::translate_gateway(ingress, options, &mut collector)?;
    let virtual_services = virtual_service::translate_virtual_services(ingress, options, &mut collector)?;

    let mut configs = Vec::with_capacity(1 + virtual_services.len());
    configs.push(gateway);
    configs.extend(virtual_services);
    Ok(Translation { configs, skipped: collector.skipped })
}
