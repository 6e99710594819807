// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress, IngressBackend, ServiceBackendPort};
use kube::ResourceExt;

use super::{FragmentCollector, TranslationError, TranslatorOptions};
use crate::common::{
    gateway_reference, service_host, virtual_service_name, ConfigObject, ConfigSpec, Destination, HttpMatchRequest, HttpRoute,
    HttpRouteDestination, PortSelector, ResourceKey, StringMatch, VirtualServiceSpec, MESH_INGRESS_NAMESPACE, WILDCARD_HOST,
};

const PATH_TYPE_EXACT: &str = "Exact";
const PATH_TYPE_PREFIX: &str = "Prefix";
const PATH_TYPE_IMPLEMENTATION_SPECIFIC: &str = "ImplementationSpecific";
const FULL_WEIGHT: i32 = 100;

/// One virtual service per host, routes in rule order. Rules sharing a host are folded together.
pub(super) fn translate_virtual_services(
    ingress: &Ingress,
    options: &TranslatorOptions,
    collector: &mut FragmentCollector,
) -> Result<Vec<ConfigObject>, TranslationError> {
    let key = ResourceKey::from(ingress);
    let spec = ingress.spec.as_ref();
    let rules = spec.and_then(|s| s.rules.as_ref()).map(Vec::as_slice).unwrap_or_default();
    let mut routes_by_host: Vec<(String, Vec<HttpRoute>)> = vec![];

    if rules.is_empty() {
        if let Some(backend) = spec.and_then(|s| s.default_backend.as_ref()) {
            if let Some(destination) = collector.accept(destination(backend, WILDCARD_HOST, &key.namespace, options))? {
                let route = HttpRoute { matches: vec![], route: vec![HttpRouteDestination { destination, weight: FULL_WEIGHT }] };
                routes_by_host.push((WILDCARD_HOST.to_owned(), vec![route]));
            }
        }
    }

    for rule in rules {
        let host = rule.host.clone().filter(|h| !h.is_empty()).unwrap_or(WILDCARD_HOST.to_owned());
        let Some(http) = rule.http.as_ref().filter(|http| !http.paths.is_empty()) else {
            collector.accept::<()>(Err(TranslationError::MissingPaths { host }))?;
            continue;
        };

        let mut routes = vec![];
        for path in &http.paths {
            if let Some(route) = collector.accept(path_route(path, &key.namespace, options))? {
                routes.push(route);
            }
        }
        if routes.is_empty() {
            continue;
        }

        if let Some((_, existing)) = routes_by_host.iter_mut().find(|(h, _)| *h == host) {
            existing.extend(routes);
        } else {
            routes_by_host.push((host, routes));
        }
    }

    let gateway = gateway_reference(&ingress.name_any());
    Ok(routes_by_host
        .into_iter()
        .map(|(host, http)| {
            let virtual_service = VirtualServiceSpec { hosts: vec![host.clone()], gateways: vec![gateway.clone()], http };
            ConfigObject::new(
                &virtual_service_name(&host),
                MESH_INGRESS_NAMESPACE,
                &options.domain_suffix,
                ConfigSpec::VirtualService(virtual_service),
            )
        })
        .collect())
}

fn path_route(path: &HTTPIngressPath, namespace: &str, options: &TranslatorOptions) -> Result<HttpRoute, TranslationError> {
    let uri = path_match(path)?;
    let destination = destination(&path.backend, path.path.as_deref().unwrap_or_default(), namespace, options)?;
    Ok(HttpRoute {
        matches: uri.into_iter().map(|uri| HttpMatchRequest { uri }).collect(),
        route: vec![HttpRouteDestination { destination, weight: FULL_WEIGHT }],
    })
}

/// `None` means the path matches every request.
fn path_match(path: &HTTPIngressPath) -> Result<Option<StringMatch>, TranslationError> {
    let value = path.path.as_deref().unwrap_or_default();
    match path.path_type.as_str() {
        PATH_TYPE_EXACT => {
            ensure_absolute(value)?;
            Ok(Some(StringMatch::Exact(value.to_owned())))
        },
        PATH_TYPE_PREFIX => {
            ensure_absolute(value)?;
            let trimmed = value.trim_end_matches('/');
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(StringMatch::Prefix(trimmed.to_owned())))
            }
        },
        PATH_TYPE_IMPLEMENTATION_SPECIFIC | "" => Ok(implementation_specific_match(value)),
        other => Err(TranslationError::UnsupportedPathType { path: value.to_owned(), path_type: other.to_owned() }),
    }
}

fn implementation_specific_match(value: &str) -> Option<StringMatch> {
    if value.is_empty() {
        return None;
    }
    match value.strip_suffix(".*").or_else(|| value.strip_suffix("/*")) {
        Some("") => None,
        Some(prefix) => Some(StringMatch::Prefix(prefix.to_owned())),
        None => Some(StringMatch::Exact(value.to_owned())),
    }
}

fn ensure_absolute(path: &str) -> Result<(), TranslationError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(TranslationError::InvalidPath { path: path.to_owned() })
    }
}

fn destination(backend: &IngressBackend, path: &str, namespace: &str, options: &TranslatorOptions) -> Result<Destination, TranslationError> {
    let Some(service) = backend.service.as_ref().filter(|s| !s.name.is_empty()) else {
        return Err(TranslationError::MissingService { path: path.to_owned() });
    };

    let port = match service.port.as_ref() {
        Some(ServiceBackendPort { number: Some(number), .. }) if *number > 0 => PortSelector::Number(number.unsigned_abs()),
        Some(ServiceBackendPort { name: Some(name), .. }) if !name.is_empty() => PortSelector::Name(name.clone()),
        _ => return Err(TranslationError::MissingServicePort { service: service.name.clone() }),
    };

    Ok(Destination { host: service_host(&service.name, namespace, &options.domain_suffix), port })
}
