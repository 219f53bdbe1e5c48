// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and an in-memory object store.

use crate::error::{Result as SyncResult, SyncError};
use crate::kubernetes::ObjectStore;
use crate::sync::build_replica;
use crate::types::{Reference, SyncObject, SyncObjectSpec, SyncObjectStatus};
use http::{Request, Response};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use kube::api::{ApiResource, DynamicObject, ObjectMeta};
use kube::client::Body;
use kube::core::{ErrorResponse, GroupVersionKind};
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request method and path.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for requests with the given method, matching the path or a prefix of it
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Longest registered prefix wins
        responses
            .iter()
            .filter(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .max_by_key(|((_, p), _)| p.len())
            .map(|(_, resp)| resp.clone())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("resource", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace list JSON response
pub fn namespace_list_json(names: &[&str]) -> String {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": name, "uid": format!("uid-{}", name) }
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Create a mock ConfigMap JSON response
pub fn configmap_json(namespace: &str, name: &str, data: &[(&str, &str)]) -> String {
    let data: BTreeMap<&str, &str> = data.iter().copied().collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "data": data
    })
    .to_string()
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// A ConfigMap as the dynamic object the operator replicates
pub fn configmap(namespace: &str, name: &str, data: &[(&str, &str)]) -> DynamicObject {
    let resource = ApiResource::erase::<ConfigMap>(&());
    let data: BTreeMap<&str, &str> = data.iter().copied().collect();
    let mut object = DynamicObject::new(name, &resource).within(namespace);
    object.data = serde_json::json!({ "data": data });
    object
}

/// A replica of [`configmap_reference`] as the operator would have written it
pub fn configmap_replica(namespace: &str, data: &[(&str, &str)]) -> DynamicObject {
    let source = configmap("origin-ns", "origin-configmap", data);
    build_replica(&source, &configmap_reference(), namespace)
}

pub fn configmap_reference() -> Reference {
    Reference {
        group: String::new(),
        version: "v1".to_string(),
        kind: "ConfigMap".to_string(),
        name: "origin-configmap".to_string(),
        namespace: "origin-ns".to_string(),
    }
}

/// A SyncObject replicating [`configmap_reference`] everywhere
pub fn make_syncobject(name: &str) -> SyncObject {
    SyncObject {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: SyncObjectSpec {
            reference: configmap_reference(),
            target_namespaces: vec![],
            ignore_namespaces: vec![],
            disable_finalizer: false,
            interval: "10h".to_string(),
        },
        status: None,
    }
}

type ObjectKey = (String, String, String);

#[derive(Default)]
struct MemoryState {
    namespaces: Vec<String>,
    declarations: BTreeMap<String, SyncObject>,
    objects: BTreeMap<ObjectKey, DynamicObject>,
    revision: u64,
    failing_namespaces: BTreeSet<String>,
    fail_namespace_listing: bool,
}

impl MemoryState {
    fn next_revision(&mut self) -> String {
        self.revision += 1;
        self.revision.to_string()
    }

    fn check_writable(&self, namespace: &str) -> SyncResult<()> {
        if self.failing_namespaces.contains(namespace) {
            return Err(SyncError::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("injected failure in {}", namespace),
                reason: "InternalError".to_string(),
                code: 500,
            })));
        }
        Ok(())
    }
}

fn object_key(kind: &str, namespace: &str, name: &str) -> ObjectKey {
    (kind.to_string(), namespace.to_string(), name.to_string())
}

fn kind_of(object: &DynamicObject) -> String {
    object
        .types
        .as_ref()
        .map(|t| t.kind.clone())
        .unwrap_or_default()
}

/// In-memory [`ObjectStore`] mimicking API server semantics: server-assigned
/// uid and resourceVersion, optimistic concurrency on SyncObjects, and
/// soft deletion while finalizers are present.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn with_namespaces(namespaces: &[&str]) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().namespaces = namespaces.iter().map(|n| n.to_string()).collect();
        store
    }

    /// Insert or overwrite an object, bypassing failure injection
    pub fn insert_object(&self, mut object: DynamicObject) {
        let mut state = self.state.lock().unwrap();
        let revision = state.next_revision();
        object.metadata.uid = Some(format!("uid-{}", revision));
        object.metadata.resource_version = Some(revision);
        let key = object_key(
            &kind_of(&object),
            &object.namespace().unwrap_or_default(),
            &object.name_any(),
        );
        state.objects.insert(key, object);
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<DynamicObject> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .iter()
            .find(|((_, ns, n), _)| ns == namespace && n == name)
            .map(|(_, object)| object.clone())
    }

    pub fn objects_named(&self, name: &str) -> Vec<DynamicObject> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .iter()
            .filter(|((_, _, n), _)| n == name)
            .map(|(_, object)| object.clone())
            .collect()
    }

    pub fn insert_declaration(&self, mut declaration: SyncObject) -> SyncObject {
        let mut state = self.state.lock().unwrap();
        let revision = state.next_revision();
        declaration.metadata.uid = Some(format!("uid-{}", revision));
        declaration.metadata.resource_version = Some(revision);
        state
            .declarations
            .insert(declaration.name_any(), declaration.clone());
        declaration
    }

    pub fn declaration(&self, name: &str) -> Option<SyncObject> {
        self.state.lock().unwrap().declarations.get(name).cloned()
    }

    /// Edit a stored SyncObject the way a user would
    pub fn update_declaration(&self, name: &str, edit: impl FnOnce(&mut SyncObject)) {
        let mut state = self.state.lock().unwrap();
        let revision = state.next_revision();
        if let Some(declaration) = state.declarations.get_mut(name) {
            edit(declaration);
            declaration.metadata.resource_version = Some(revision);
        }
    }

    /// Delete a SyncObject; it lingers with a deletion timestamp while finalizers remain
    pub fn delete_declaration(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let revision = state.next_revision();
        let has_finalizers = state
            .declarations
            .get(name)
            .is_some_and(|d| !d.finalizers().is_empty());

        if has_finalizers {
            if let Some(declaration) = state.declarations.get_mut(name) {
                declaration.metadata.deletion_timestamp = Some(Time(Utc::now()));
                declaration.metadata.resource_version = Some(revision);
            }
        } else {
            state.declarations.remove(name);
        }
    }

    /// Make every create, update and delete in `namespace` fail
    pub fn fail_writes_in(&self, namespace: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_namespaces
            .insert(namespace.to_string());
    }

    pub fn fail_namespace_listing(&self) {
        self.state.lock().unwrap().fail_namespace_listing = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_namespaces.clear();
        state.fail_namespace_listing = false;
    }
}

impl ObjectStore for MemoryStore {
    async fn get_declaration(&self, name: &str) -> SyncResult<Option<SyncObject>> {
        Ok(self.declaration(name))
    }

    async fn replace_declaration(&self, declaration: &SyncObject) -> SyncResult<SyncObject> {
        let mut state = self.state.lock().unwrap();
        let name = declaration.name_any();
        let Some(stored) = state.declarations.get(&name).cloned() else {
            return Err(SyncError::NotFound(format!("SyncObject {}", name)));
        };
        if stored.resource_version() != declaration.resource_version() {
            return Err(SyncError::Conflict(format!("SyncObject {}", name)));
        }

        let mut updated = declaration.clone();
        updated.status = stored.status;
        updated.metadata.deletion_timestamp = stored.metadata.deletion_timestamp;
        updated.metadata.resource_version = Some(state.next_revision());

        if updated.metadata.deletion_timestamp.is_some() && updated.finalizers().is_empty() {
            state.declarations.remove(&name);
        } else {
            state.declarations.insert(name, updated.clone());
        }
        Ok(updated)
    }

    async fn update_status(&self, name: &str, status: &SyncObjectStatus) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        let revision = state.next_revision();
        let Some(declaration) = state.declarations.get_mut(name) else {
            return Err(SyncError::NotFound(format!("SyncObject {}", name)));
        };
        declaration.status = Some(status.clone());
        declaration.metadata.resource_version = Some(revision);
        Ok(())
    }

    async fn list_namespaces(&self) -> SyncResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_namespace_listing {
            return Err(SyncError::NamespaceError("injected failure".to_string()));
        }
        Ok(state.namespaces.clone())
    }

    async fn get_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> SyncResult<DynamicObject> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&object_key(&gvk.kind, namespace, name))
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("{} {}/{}", gvk.kind, namespace, name)))
    }

    async fn create_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> SyncResult<DynamicObject> {
        let mut state = self.state.lock().unwrap();
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        state.check_writable(&namespace)?;

        if !state.namespaces.contains(&namespace) {
            return Err(SyncError::NotFound(format!("namespace {}", namespace)));
        }
        let key = object_key(&gvk.kind, &namespace, &name);
        if state.objects.contains_key(&key) {
            return Err(SyncError::AlreadyExists(format!(
                "{} {}/{}",
                gvk.kind, namespace, name
            )));
        }

        let revision = state.next_revision();
        let mut created = object.clone();
        created.metadata.uid = Some(format!("uid-{}", revision));
        created.metadata.resource_version = Some(revision);
        state.objects.insert(key, created.clone());
        Ok(created)
    }

    async fn replace_object(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> SyncResult<DynamicObject> {
        let mut state = self.state.lock().unwrap();
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        state.check_writable(&namespace)?;

        let key = object_key(&gvk.kind, &namespace, &name);
        let Some(uid) = state.objects.get(&key).map(|o| o.metadata.uid.clone()) else {
            return Err(SyncError::NotFound(format!("{} {}/{}", gvk.kind, namespace, name)));
        };

        let mut updated = object.clone();
        updated.metadata.uid = uid;
        updated.metadata.resource_version = Some(state.next_revision());
        state.objects.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete_object(
        &self,
        gvk: &GroupVersionKind,
        namespace: &str,
        name: &str,
    ) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.check_writable(namespace)?;

        state
            .objects
            .remove(&object_key(&gvk.kind, namespace, name))
            .map(|_| ())
            .ok_or_else(|| SyncError::NotFound(format!("{} {}/{}", gvk.kind, namespace, name)))
    }
}
