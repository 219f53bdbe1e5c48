// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Explicit mapping from group/version/kind to the API resource used to reach it.

use k8s_openapi::api::core::v1::{
    ConfigMap, LimitRange, ResourceQuota, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::networking::v1::NetworkPolicy;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::core::{ApiResource, GroupVersionKind};
use std::collections::HashMap;
use tracing::debug;

type Key = (String, String, String);

fn key(gvk: &GroupVersionKind) -> Key {
    (gvk.group.clone(), gvk.version.clone(), gvk.kind.clone())
}

/// Resolves reference kinds to `ApiResource`s without any process-wide registration.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<Key, ApiResource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the namespaced built-in kinds most commonly replicated
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ApiResource::erase::<ConfigMap>(&()));
        registry.register(ApiResource::erase::<Secret>(&()));
        registry.register(ApiResource::erase::<Service>(&()));
        registry.register(ApiResource::erase::<ServiceAccount>(&()));
        registry.register(ApiResource::erase::<LimitRange>(&()));
        registry.register(ApiResource::erase::<ResourceQuota>(&()));
        registry.register(ApiResource::erase::<NetworkPolicy>(&()));
        registry.register(ApiResource::erase::<Role>(&()));
        registry.register(ApiResource::erase::<RoleBinding>(&()));
        registry
    }

    pub fn register(&mut self, resource: ApiResource) {
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
        self.resources.insert(key(&gvk), resource);
    }

    /// Look up a kind, guessing the plural for kinds that were never registered
    pub fn resolve(&self, gvk: &GroupVersionKind) -> ApiResource {
        match self.resources.get(&key(gvk)) {
            Some(resource) => resource.clone(),
            None => {
                debug!(
                    "Kind {}/{} {} not registered, inferring API resource",
                    gvk.group, gvk.version, gvk.kind
                );
                ApiResource::from_gvk(gvk)
            }
        }
    }
}
