// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod config;
mod mesh;
mod resource_key;

pub use config::{ConfigEvent, ConfigKey, ConfigKind, ConfigMeta, ConfigObject, ConfigSpec, CONFIG_GROUP_NAME, CONFIG_VERSION};
pub use mesh::{
    Destination, GatewaySpec, HttpMatchRequest, HttpRoute, HttpRouteDestination, Port, PortSelector, Protocol, Server, ServerTls,
    StringMatch, TlsMode, VirtualServiceSpec,
};
pub use resource_key::{ingress_namespace, ResourceKey, DEFAULT_NAMESPACE_NAME};

/// Role suffix shared by every object derived from an ingress.
pub const INGRESS_GATEWAY_SUFFIX: &str = "istio-autogenerated-k8s-ingress";
/// Namespace holding every derived object, whatever the source namespace.
pub const MESH_INGRESS_NAMESPACE: &str = "istio-system";
pub const INGRESS_GATEWAY_SELECTOR: (&str, &str) = ("istio", "ingressgateway");
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const DEFAULT_INGRESS_CLASS: &str = "istio";
pub const WILDCARD_HOST: &str = "*";

pub fn gateway_name(ingress_name: &str) -> String {
    format!("{ingress_name}-{INGRESS_GATEWAY_SUFFIX}")
}

pub fn gateway_reference(ingress_name: &str) -> String {
    format!("{MESH_INGRESS_NAMESPACE}/{}", gateway_name(ingress_name))
}

pub fn virtual_service_name(host: &str) -> String {
    let prefix = match host.strip_prefix(WILDCARD_HOST) {
        Some("") => "wildcard".to_owned(),
        Some(rest) => "wildcard".to_owned() + &rest.replace('.', "-"),
        None => host.replace('.', "-"),
    };
    format!("{prefix}-{INGRESS_GATEWAY_SUFFIX}")
}

pub fn service_host(service: &str, namespace: &str, domain_suffix: &str) -> String {
    format!("{service}.{namespace}.svc.{domain_suffix}")
}

pub fn format_resource<R>() -> &'static str {
    std::any::type_name::<R>().split("::").last().unwrap_or_default()
}
