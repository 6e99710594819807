// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    common::DEFAULT_INGRESS_CLASS,
    controllers::{ConstructionError, ControllerMode, ControllerOptions},
    Result,
};

const DEFAULT_RESYNC_PERIOD_SECONDS: u64 = 60;
const DEFAULT_DOMAIN_SUFFIX: &str = "cluster.local";
const DEFAULT_LOG_DIRECTORY: &str = ".";
const DEFAULT_LOG_FILE: &str = "kubvernor-ingress.log";
const DEFAULT_OPEN_TELEMETRY_ENDPOINT: &str = "http://127.0.0.1:4317";
const DEFAULT_OPEN_TELEMETRY_TIMEOUT_SECONDS: u64 = 3;

fn default_resync_period_seconds() -> u64 {
    DEFAULT_RESYNC_PERIOD_SECONDS
}

fn default_domain_suffix() -> String {
    DEFAULT_DOMAIN_SUFFIX.to_owned()
}

fn default_ingress_class() -> String {
    DEFAULT_INGRESS_CLASS.to_owned()
}

/// Where logs and traces go. Verbosity is still taken from `RUST_LOG`, `RUST_FILE_LOG` and `RUST_TRACE_LOG`.
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct LoggingConfiguration {
    #[builder(default = DEFAULT_LOG_DIRECTORY.to_owned(), setter(into))]
    pub log_directory: String,
    #[builder(default = DEFAULT_LOG_FILE.to_owned(), setter(into))]
    pub log_file: String,
    #[builder(default = DEFAULT_OPEN_TELEMETRY_ENDPOINT.to_owned(), setter(into))]
    pub open_telemetry_endpoint: String,
    #[builder(default = DEFAULT_OPEN_TELEMETRY_TIMEOUT_SECONDS)]
    pub open_telemetry_timeout_seconds: u64,
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoggingConfiguration {
    pub fn open_telemetry_timeout(&self) -> Duration {
        Duration::from_secs(self.open_telemetry_timeout_seconds)
    }
}

#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    #[builder(setter(into))]
    pub controller_name: String,
    #[builder(default)]
    pub enable_open_telemetry: Option<bool>,
    #[serde(default)]
    #[builder(default, setter(into))]
    pub watched_namespace: String,
    #[serde(default = "default_resync_period_seconds")]
    #[builder(default = DEFAULT_RESYNC_PERIOD_SECONDS)]
    pub resync_period_seconds: u64,
    #[serde(default = "default_domain_suffix")]
    #[builder(default = default_domain_suffix(), setter(into))]
    pub domain_suffix: String,
    #[serde(default)]
    #[builder(default)]
    pub controller_mode: ControllerMode,
    #[serde(default = "default_ingress_class")]
    #[builder(default = default_ingress_class(), setter(into))]
    pub ingress_class: String,
    #[serde(default)]
    #[builder(default)]
    pub logging: LoggingConfiguration,
}

#[derive(Error, Debug)]
enum ConfigurationError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("log file name must be not empty")]
    LogFile,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(ConfigurationError::ControllerName.into());
        }
        if self.logging.log_file.is_empty() {
            return Err(ConfigurationError::LogFile.into());
        }
        ControllerOptions::try_from(self)?;
        Ok(())
    }
}

impl TryFrom<&Configuration> for ControllerOptions {
    type Error = ConstructionError;

    fn try_from(configuration: &Configuration) -> std::result::Result<Self, Self::Error> {
        let options = ControllerOptions::builder()
            .watched_namespace(configuration.watched_namespace.clone())
            .resync_period(Duration::from_secs(configuration.resync_period_seconds))
            .domain_suffix(configuration.domain_suffix.clone())
            .mode(configuration.controller_mode)
            .ingress_class(configuration.ingress_class.clone())
            .build();
        options.validate()?;
        Ok(options)
    }
}
