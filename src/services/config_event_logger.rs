// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::common::ConfigEvent;

const TARGET: &str = "kubvernor_ingress::services::config_event_logger";

/// Reports every change of the derived configuration until the controller goes away.
#[derive(TypedBuilder)]
pub struct ConfigEventLoggerService {
    controller_name: String,
    receiver: broadcast::Receiver<ConfigEvent>,
}

impl ConfigEventLoggerService {
    pub async fn start(&mut self) -> crate::Result<()> {
        let mut changes = 0_u64;
        loop {
            match self.receiver.recv().await {
                Ok(ConfigEvent::Resynced) => {
                    info!(target: TARGET, "{} config resynced after {changes} changes", self.controller_name);
                    changes = 0;
                },
                Ok(event) => {
                    changes += 1;
                    match &event {
                        ConfigEvent::Added(config) | ConfigEvent::Updated { new: config, .. } => {
                            debug!(target: TARGET, "{} {event} {}", self.controller_name, serde_json::to_string(&config.spec).unwrap_or_default());
                        },
                        ConfigEvent::Deleted(_) | ConfigEvent::Resynced => debug!(target: TARGET, "{} {event}", self.controller_name),
                    }
                },
                Err(RecvError::Lagged(missed)) => warn!(target: TARGET, "{} missed {missed} config events", self.controller_name),
                Err(RecvError::Closed) => {
                    info!(target: TARGET, "{} config events closed", self.controller_name);
                    return Ok(());
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::common::{ConfigObject, ConfigSpec, GatewaySpec, MESH_INGRESS_NAMESPACE};

    #[tokio::test]
    async fn stops_when_sender_is_gone() {
        let (sender, receiver) = broadcast::channel(1);
        let mut service = ConfigEventLoggerService::builder().controller_name("test".to_owned()).receiver(receiver).build();
        let gateway = Arc::new(ConfigObject::new("gw", MESH_INGRESS_NAMESPACE, "foo.com", ConfigSpec::Gateway(GatewaySpec::default())));
        // capacity 1, so the first event is lagged behind the second
        sender.send(ConfigEvent::Added(Arc::clone(&gateway))).expect("receiver alive");
        sender.send(ConfigEvent::Deleted(gateway)).expect("receiver alive");
        drop(sender);
        assert!(service.start().await.is_ok());
    }
}
