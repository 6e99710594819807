// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use itertools::Itertools;
use k8s_openapi::api::networking::v1::{Ingress, IngressTLS};
use kube::ResourceExt;

use super::{FragmentCollector, TranslationError, TranslatorOptions};
use crate::common::{
    gateway_name, ConfigObject, ConfigSpec, GatewaySpec, Port, Protocol, ResourceKey, Server, ServerTls, TlsMode, INGRESS_GATEWAY_SELECTOR,
    MESH_INGRESS_NAMESPACE, WILDCARD_HOST,
};

const HTTP_PORT: u32 = 80;
const HTTPS_PORT: u32 = 443;

pub(super) fn translate_gateway(
    ingress: &Ingress,
    options: &TranslatorOptions,
    collector: &mut FragmentCollector,
) -> Result<ConfigObject, TranslationError> {
    let key = ResourceKey::from(ingress);
    let spec = ingress.spec.as_ref();

    let mut hosts: Vec<String> = spec
        .and_then(|s| s.rules.as_ref())
        .into_iter()
        .flatten()
        .map(|rule| rule.host.as_deref().filter(|h| !h.is_empty()).unwrap_or(WILDCARD_HOST).to_owned())
        .unique()
        .collect();
    if hosts.is_empty() {
        hosts.push(WILDCARD_HOST.to_owned());
    }

    let mut servers = vec![Server {
        port: Port { number: HTTP_PORT, protocol: Protocol::Http, name: format!("http-{HTTP_PORT}-ingress-{}-{}", key.name, key.namespace) },
        hosts,
        tls: None,
    }];

    for (index, tls) in spec.and_then(|s| s.tls.as_ref()).into_iter().flatten().enumerate() {
        if let Some(server) = collector.accept(https_server(&key, index, tls))? {
            servers.push(server);
        }
    }

    let (selector_key, selector_value) = INGRESS_GATEWAY_SELECTOR;
    let gateway = GatewaySpec { selector: BTreeMap::from([(selector_key.to_owned(), selector_value.to_owned())]), servers };
    Ok(ConfigObject::new(&gateway_name(&ingress.name_any()), MESH_INGRESS_NAMESPACE, &options.domain_suffix, ConfigSpec::Gateway(gateway)))
}

fn https_server(key: &ResourceKey, index: usize, tls: &IngressTLS) -> Result<Server, TranslationError> {
    let Some(secret_name) = tls.secret_name.as_ref().filter(|s| !s.is_empty()) else {
        return Err(TranslationError::MissingTlsSecret { index });
    };

    let hosts = match tls.hosts.as_ref() {
        Some(hosts) if !hosts.is_empty() => hosts.clone(),
        _ => vec![WILDCARD_HOST.to_owned()],
    };

    Ok(Server {
        port: Port {
            number: HTTPS_PORT,
            protocol: Protocol::Https,
            name: format!("https-{HTTPS_PORT}-ingress-{}-{}-{index}", key.name, key.namespace),
        },
        hosts,
        tls: Some(ServerTls { https_redirect: false, mode: TlsMode::Simple, credential_name: secret_name.clone() }),
    })
}
