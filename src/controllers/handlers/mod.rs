// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::sync::Arc;

use k8s_openapi::api::networking::v1::Ingress;
use kube::{Resource, ResourceExt};

use crate::common::INGRESS_CLASS_ANNOTATION;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    New,
    SpecNotChanged,
    SpecChanged,
    VersionNotChanged,
}

pub type ResourceCheckerArgs<'a, T> = (&'a Arc<T>, &'a Arc<T>);
pub type ResourceChecker<T> = fn(args: ResourceCheckerArgs<T>) -> ResourceState;

pub struct ResourceStateChecker {}

impl ResourceStateChecker {
    pub fn check_status<R>(resource: &Arc<R>, maybe_stored_resource: Option<&Arc<R>>, resource_spec_checker: ResourceChecker<R>) -> ResourceState
    where
        R: Resource,
    {
        if let Some(stored_resource) = maybe_stored_resource {
            let version = resource.meta().resource_version.as_ref();
            if version.is_some() && stored_resource.meta().resource_version.as_ref() == version {
                return ResourceState::VersionNotChanged;
            }
            resource_spec_checker((resource, stored_resource))
        } else {
            ResourceState::New
        }
    }
}

pub fn check_ingress_spec_changed(args: ResourceCheckerArgs<Ingress>) -> ResourceState {
    let (resource, stored_resource) = args;
    let class_changed = resource.annotations().get(INGRESS_CLASS_ANNOTATION) != stored_resource.annotations().get(INGRESS_CLASS_ANNOTATION);
    if resource.spec == stored_resource.spec && !class_changed {
        ResourceState::SpecNotChanged
    } else {
        ResourceState::SpecChanged
    }
}
