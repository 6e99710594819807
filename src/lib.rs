// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Adapter from Kubernetes ingresses to mesh gateway and virtual service config.

pub mod common;
mod configuration;
pub mod controllers;
pub mod mirror;
pub mod services;
pub mod state;
pub mod translator;

pub use configuration::{Configuration, LoggingConfiguration};
use controllers::{ConfigStoreCache, ControllerOptions, IngressController};
use kube::Client;
use mirror::KubeIngressMirror;
use services::ConfigEventLoggerService;
use state::ConfigCache;
use tracing::{info, warn};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

pub async fn start(configuration: Configuration) -> Result<()> {
    let options = ControllerOptions::try_from(&configuration)?;
    info!("Kubvernor ingress adapter started {}", configuration.controller_name);
    let client = Client::try_default().await?;

    let mirror = KubeIngressMirror::new(client, &options.watched_namespace);
    let controller = IngressController::new(options, ConfigCache::new())?;

    let mut config_event_logger =
        ConfigEventLoggerService::builder().controller_name(configuration.controller_name.clone()).receiver(controller.subscribe()).build();
    let config_event_logger = tokio::spawn(async move { config_event_logger.start().await });

    controller
        .run(&mirror, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for shutdown signal {e}");
            }
        })
        .await?;

    drop(controller);
    config_event_logger.await??;
    info!("Kubvernor ingress adapter stopped");
    Ok(())
}
