// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::api::networking::v1::Ingress;

use super::{translate, ControllerMode, TranslationError, TranslatorOptions};
use crate::common::{ConfigKind, HttpRoute, PortSelector, Protocol, StringMatch, TlsMode, MESH_INGRESS_NAMESPACE};

fn ingress(yaml: &str) -> Ingress {
    serde_yaml::from_str(yaml).expect("valid ingress yaml")
}

fn options(mode: ControllerMode) -> TranslatorOptions {
    TranslatorOptions::builder().domain_suffix("foo.com").mode(mode).build()
}

fn uris(routes: &[HttpRoute]) -> Vec<Option<StringMatch>> {
    routes.iter().map(|r| r.matches.first().map(|m| m.uri.clone())).collect()
}

const SIMPLE_INGRESS: &str = r"
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: ingress1
  namespace: default
spec:
  defaultBackend:
    service:
      name: foo
      port:
        number: 80
  rules:
  - host: foo.bar.com
    http:
      paths:
      - path: /foo
        pathType: ImplementationSpecific
        backend:
          service:
            name: foo
            port:
              number: 80
";

#[test]
pub fn test_single_rule_ingress() {
    let translation = translate(&ingress(SIMPLE_INGRESS), &options(ControllerMode::Strict)).expect("translated");
    assert!(translation.skipped.is_empty());
    assert_eq!(translation.configs.len(), 2);

    let gateway = &translation.configs[0];
    assert_eq!(gateway.kind(), ConfigKind::Gateway);
    assert_eq!(gateway.name(), "ingress1-istio-autogenerated-k8s-ingress");
    assert_eq!(gateway.namespace(), MESH_INGRESS_NAMESPACE);
    assert_eq!(gateway.meta.domain, "foo.com");
    let servers = &gateway.gateway().expect("gateway spec").servers;
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].port.number, 80);
    assert_eq!(servers[0].port.protocol, Protocol::Http);
    assert_eq!(servers[0].port.name, "http-80-ingress-ingress1-default");
    assert_eq!(servers[0].hosts, vec!["foo.bar.com"]);

    let virtual_service = &translation.configs[1];
    assert_eq!(virtual_service.name(), "foo-bar-com-istio-autogenerated-k8s-ingress");
    assert_eq!(virtual_service.namespace(), MESH_INGRESS_NAMESPACE);
    let spec = virtual_service.virtual_service().expect("virtual service spec");
    assert_eq!(spec.hosts, vec!["foo.bar.com"]);
    assert_eq!(spec.gateways, vec!["istio-system/ingress1-istio-autogenerated-k8s-ingress"]);
    assert_eq!(uris(&spec.http), vec![Some(StringMatch::Exact("/foo".to_owned()))]);
    assert_eq!(spec.http[0].route[0].destination.host, "foo.default.svc.foo.com");
    assert_eq!(spec.http[0].route[0].destination.port, PortSelector::Number(80));
    assert_eq!(spec.http[0].route[0].weight, 100);
}

#[test]
pub fn test_translation_is_deterministic() {
    let ingress = ingress(SIMPLE_INGRESS);
    let first = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    let second = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    assert_eq!(serde_json::to_vec(&first.configs).expect("json"), serde_json::to_vec(&second.configs).expect("json"));
}

#[test]
pub fn test_rule_order_is_preserved() {
    let ingress = ingress(
        r"
metadata:
  name: ordered
  namespace: default
spec:
  rules:
  - host: a.com
    http:
      paths:
      - path: /a
        pathType: Exact
        backend:
          service:
            name: svc-a
            port:
              number: 80
      - path: /b
        pathType: Exact
        backend:
          service:
            name: svc-b
            port:
              number: 80
  - host: a.com
    http:
      paths:
      - path: /c
        pathType: Exact
        backend:
          service:
            name: svc-c
            port:
              number: 80
",
    );
    let translation = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    assert_eq!(translation.configs.len(), 2);
    let spec = translation.configs[1].virtual_service().expect("virtual service");
    assert_eq!(
        uris(&spec.http),
        vec![
            Some(StringMatch::Exact("/a".to_owned())),
            Some(StringMatch::Exact("/b".to_owned())),
            Some(StringMatch::Exact("/c".to_owned()))
        ]
    );
}

#[test]
pub fn test_hosts_without_name_use_wildcard() {
    let ingress = ingress(
        r"
metadata:
  name: nohost
  namespace: apps
spec:
  rules:
  - http:
      paths:
      - path: /
        pathType: Prefix
        backend:
          service:
            name: web
            port:
              name: http
",
    );
    let translation = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    let servers = &translation.configs[0].gateway().expect("gateway").servers;
    assert_eq!(servers[0].hosts, vec!["*"]);

    let virtual_service = &translation.configs[1];
    assert_eq!(virtual_service.name(), "wildcard-istio-autogenerated-k8s-ingress");
    let spec = virtual_service.virtual_service().expect("virtual service");
    assert!(spec.http[0].is_catch_all());
    assert_eq!(spec.http[0].route[0].destination.host, "web.apps.svc.foo.com");
    assert_eq!(spec.http[0].route[0].destination.port, PortSelector::Name("http".to_owned()));
}

#[test]
pub fn test_default_backend_only() {
    let ingress = ingress(
        r"
metadata:
  name: fallback
  namespace: default
spec:
  defaultBackend:
    service:
      name: catch
      port:
        number: 8080
",
    );
    let translation = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    assert_eq!(translation.configs.len(), 2);
    let spec = translation.configs[1].virtual_service().expect("virtual service");
    assert_eq!(spec.hosts, vec!["*"]);
    assert_eq!(spec.http.len(), 1);
    assert!(spec.http[0].is_catch_all());
    assert_eq!(spec.http[0].route[0].destination.host, "catch.default.svc.foo.com");
    assert_eq!(spec.http[0].route[0].destination.port, PortSelector::Number(8080));
}

#[test]
pub fn test_path_conversion() {
    let ingress = ingress(
        r"
metadata:
  name: paths
  namespace: default
spec:
  rules:
  - host: paths.com
    http:
      paths:
      - path: /api/
        pathType: Prefix
        backend:
          service:
            name: api
            port:
              number: 80
      - path: /v1.0
        pathType: Prefix
        backend:
          service:
            name: api
            port:
              number: 80
      - path: /static/.*
        pathType: ImplementationSpecific
        backend:
          service:
            name: static
            port:
              number: 80
      - path: /assets/*
        pathType: ImplementationSpecific
        backend:
          service:
            name: static
            port:
              number: 80
      - path: /
        pathType: Prefix
        backend:
          service:
            name: web
            port:
              number: 80
",
    );
    let translation = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    let spec = translation.configs[1].virtual_service().expect("virtual service");
    assert_eq!(
        uris(&spec.http),
        vec![
            Some(StringMatch::Prefix("/api".to_owned())),
            Some(StringMatch::Prefix("/v1.0".to_owned())),
            Some(StringMatch::Prefix("/static/".to_owned())),
            Some(StringMatch::Prefix("/assets".to_owned())),
            None,
        ]
    );
}

#[test]
pub fn test_tls_servers() {
    let ingress = ingress(
        r"
metadata:
  name: secure
  namespace: shop
spec:
  tls:
  - hosts:
    - shop.com
    secretName: shop-cert
  - secretName: wildcard-cert
  rules:
  - host: shop.com
    http:
      paths:
      - path: /
        pathType: Prefix
        backend:
          service:
            name: shop
            port:
              number: 443
",
    );
    let translation = translate(&ingress, &options(ControllerMode::Strict)).expect("translated");
    let servers = &translation.configs[0].gateway().expect("gateway").servers;
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[1].port.number, 443);
    assert_eq!(servers[1].port.protocol, Protocol::Https);
    assert_eq!(servers[1].port.name, "https-443-ingress-secure-shop-0");
    assert_eq!(servers[1].hosts, vec!["shop.com"]);
    let tls = servers[1].tls.as_ref().expect("tls");
    assert_eq!(tls.mode, TlsMode::Simple);
    assert_eq!(tls.credential_name, "shop-cert");
    assert_eq!(servers[2].hosts, vec!["*"]);
    assert_eq!(servers[2].port.name, "https-443-ingress-secure-shop-1");
}

const BROKEN_INGRESS: &str = r"
metadata:
  name: broken
  namespace: default
spec:
  tls:
  - hosts:
    - broken.com
  rules:
  - host: broken.com
    http:
      paths:
      - path: /good
        pathType: Exact
        backend:
          service:
            name: good
            port:
              number: 80
      - path: /bad
        pathType: Regex
        backend:
          service:
            name: bad
            port:
              number: 80
  - host: other.com
    http:
      paths:
      - path: /noport
        pathType: Exact
        backend:
          service:
            name: noport
";

#[test]
pub fn test_strict_mode_rejects_whole_ingress() {
    let result = translate(&ingress(BROKEN_INGRESS), &options(ControllerMode::Strict));
    assert_eq!(result, Err(TranslationError::MissingTlsSecret { index: 0 }));
}

#[test]
pub fn test_permissive_mode_skips_fragments() {
    let translation = translate(&ingress(BROKEN_INGRESS), &options(ControllerMode::Permissive)).expect("translated");
    assert_eq!(
        translation.skipped,
        vec![
            TranslationError::MissingTlsSecret { index: 0 },
            TranslationError::UnsupportedPathType { path: "/bad".to_owned(), path_type: "Regex".to_owned() },
            TranslationError::MissingServicePort { service: "noport".to_owned() },
        ]
    );

    assert_eq!(translation.configs.len(), 2);
    let servers = &translation.configs[0].gateway().expect("gateway").servers;
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].hosts, vec!["broken.com", "other.com"]);

    let virtual_service = &translation.configs[1];
    assert_eq!(virtual_service.name(), "broken-com-istio-autogenerated-k8s-ingress");
    let spec = virtual_service.virtual_service().expect("virtual service");
    assert_eq!(uris(&spec.http), vec![Some(StringMatch::Exact("/good".to_owned()))]);
}

#[test]
pub fn test_strict_mode_rejects_missing_paths_and_relative_paths() {
    let no_paths = ingress(
        r"
metadata:
  name: empty
  namespace: default
spec:
  rules:
  - host: empty.com
",
    );
    assert_eq!(
        translate(&no_paths, &options(ControllerMode::Strict)),
        Err(TranslationError::MissingPaths { host: "empty.com".to_owned() })
    );
    let permissive = translate(&no_paths, &options(ControllerMode::Permissive)).expect("translated");
    assert_eq!(permissive.configs.len(), 1);

    let relative = ingress(
        r"
metadata:
  name: relative
  namespace: default
spec:
  rules:
  - host: relative.com
    http:
      paths:
      - path: relative
        pathType: Exact
        backend:
          service:
            name: svc
            port:
              number: 80
",
    );
    assert_eq!(
        translate(&relative, &options(ControllerMode::Strict)),
        Err(TranslationError::InvalidPath { path: "relative".to_owned() })
    );
}

#[test]
pub fn test_unnamed_ingress_is_rejected() {
    let unnamed = ingress(
        r"
metadata:
  namespace: default
spec: {}
",
    );
    assert_eq!(translate(&unnamed, &options(ControllerMode::Permissive)), Err(TranslationError::MissingName));
}
