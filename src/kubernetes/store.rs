// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Store abstraction used by the reconcile loop, and its Kubernetes implementation.

use crate::constants::OPERATOR_NAME;
use crate::error::{Result, SyncError};
use crate::kubernetes::namespaces::list_namespace_names;
use crate::kubernetes::registry::ResourceRegistry;
use crate::types::{SyncObject, SyncObjectStatus};
use kube::{
    api::{DeleteParams, DynamicObject, Patch, PatchParams, PostParams},
    core::GroupVersionKind,
    Api, Client, ResourceExt,
};
use std::future::Future;
use tracing::instrument;

/// CRUD operations a reconcile pass needs from the cluster.
///
/// Errors are classified into [`SyncError::NotFound`], [`SyncError::AlreadyExists`]
/// and [`SyncError::Conflict`] so callers can branch on them without inspecting
/// transport details.
pub trait ObjectStore: Send + Sync {
    /// Fetch a SyncObject, `None` when it does not exist
    fn get_declaration(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SyncObject>>> + Send;

    /// Write a SyncObject back, failing with `Conflict` when its resourceVersion is stale
    fn replace_declaration(
        &self,
        declaration: &SyncObject,
    ) -> impl Future<Output = Result<SyncObject>> + Send;

    fn update_status(
        &self,
        name: &str,
        status: &SyncObjectStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn get_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<DynamicObject>> + Send;

    fn create_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> impl Future<Output = Result<DynamicObject>> + Send;

    fn replace_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> impl Future<Output = Result<DynamicObject>> + Send;

    fn delete_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`ObjectStore`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    registry: ResourceRegistry,
}

impl KubeStore {
    pub fn new(client: Client, registry: ResourceRegistry) -> Self {
        Self { client, registry }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn syncobjects(&self) -> Api<SyncObject> {
        Api::all(self.client.clone())
    }

    fn dynamic_api(&self, gvk: &GroupVersionKind, namespace: &str) -> Api<DynamicObject> {
        let resource = self.registry.resolve(gvk);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

fn describe(gvk: &GroupVersionKind, namespace: &str, name: &str) -> String {
    format!("{} {}/{}", gvk.kind, namespace, name)
}

/// Map API failures onto the error kinds the reconcile loop reacts to
pub fn classify(error: kube::Error, what: String) -> SyncError {
    match error {
        kube::Error::Api(response) if response.code == 404 => SyncError::NotFound(what),
        kube::Error::Api(response) if response.code == 409 && response.reason == "AlreadyExists" => {
            SyncError::AlreadyExists(what)
        }
        kube::Error::Api(response) if response.code == 409 => SyncError::Conflict(what),
        other => SyncError::KubeError(other),
    }
}

impl ObjectStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_declaration(&self, name: &str) -> Result<Option<SyncObject>> {
        Ok(self.syncobjects().get_opt(name).await?)
    }

    #[instrument(skip(self, declaration), fields(syncobject = %declaration.name_any()))]
    async fn replace_declaration(&self, declaration: &SyncObject) -> Result<SyncObject> {
        let name = declaration.name_any();
        self.syncobjects()
            .replace(&name, &post_params(), declaration)
            .await
            .map_err(|e| classify(e, format!("SyncObject {}", name)))
    }

    #[instrument(skip(self, status))]
    async fn update_status(&self, name: &str, status: &SyncObjectStatus) -> Result<()> {
        let pp = PatchParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        };
        let patch = serde_json::json!({ "status": status });

        self.syncobjects()
            .patch_status(name, &pp, &Patch::Merge(&patch))
            .await
            .map_err(|e| classify(e, format!("SyncObject {}", name)))?;

        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        list_namespace_names(&self.client).await
    }

    #[instrument(skip(self, gvk), fields(kind = %gvk.kind))]
    async fn get_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject> {
        self.dynamic_api(gvk, namespace)
            .get(name)
            .await
            .map_err(|e| classify(e, describe(gvk, namespace, name)))
    }

    #[instrument(skip(self, gvk, object), fields(kind = %gvk.kind, namespace = ?object.metadata.namespace))]
    async fn create_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let namespace = object.namespace().unwrap_or_default();
        self.dynamic_api(gvk, &namespace)
            .create(&post_params(), object)
            .await
            .map_err(|e| classify(e, describe(gvk, &namespace, &object.name_any())))
    }

    #[instrument(skip(self, gvk, object), fields(kind = %gvk.kind, namespace = ?object.metadata.namespace))]
    async fn replace_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        self.dynamic_api(gvk, &namespace)
            .replace(&name, &post_params(), object)
            .await
            .map_err(|e| classify(e, describe(gvk, &namespace, &name)))
    }

    #[instrument(skip(self, gvk), fields(kind = %gvk.kind))]
    async fn delete_object(&self, gvk: &GroupVersionKind, namespace: &str, name: &str) -> Result<()> {
        self.dynamic_api(gvk, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, describe(gvk, namespace, name)))
    }
}
