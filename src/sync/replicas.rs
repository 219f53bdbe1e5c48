// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Replica construction and create-or-update fan-out

use crate::constants::annotations;
use crate::error::Result;
use crate::kubernetes::ObjectStore;
use crate::types::Reference;
use futures::{stream, StreamExt};
use kube::{
    api::{DynamicObject, ObjectMeta, TypeMeta},
    core::GroupVersionKind,
};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

/// Outcome of writing a single replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Per-namespace results of [`sync_replicas`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub failed: Vec<String>,
}

/// Copy the reference into every target namespace.
///
/// The reference is fetched fresh; a missing reference fails the whole call.
/// Failures in individual namespaces are logged and reported, the remaining
/// namespaces are still written.
#[instrument(skip(store, namespaces), fields(reference = %reference))]
pub async fn sync_replicas<S: ObjectStore>(
    store: &S,
    reference: &Reference,
    namespaces: &[String],
    parallelism: usize,
) -> Result<SyncReport> {
    let gvk = reference.gvk();
    let source = store
        .get_object(&gvk, &reference.namespace, &reference.name)
        .await?;

    let gvk = &gvk;
    let source = &source;
    let mut results: Vec<(String, Result<Upsert>)> = stream::iter(namespaces.iter().cloned())
        .map(move |namespace| async move {
            let result = upsert_replica(store, gvk, reference, source, &namespace).await;
            (namespace, result)
        })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut report = SyncReport::default();
    for (namespace, result) in results {
        match result {
            Ok(_) => report.synced.push(namespace),
            Err(e) => {
                error!("Failed to sync {} to namespace {}: {}", reference, namespace, e);
                report.failed.push(namespace);
            }
        }
    }

    info!(
        "Synced {} to {} namespaces ({} failed)",
        reference,
        report.synced.len(),
        report.failed.len()
    );

    Ok(report)
}

/// Create the replica, falling back to a full overwrite when it already exists
pub async fn upsert_replica<S: ObjectStore>(
    store: &S,
    gvk: &GroupVersionKind,
    reference: &Reference,
    source: &DynamicObject,
    namespace: &str,
) -> Result<Upsert> {
    let replica = build_replica(source, reference, namespace);

    match store.create_object(gvk, &replica).await {
        Ok(_) => {
            info!("Created replica of {} in namespace {}", reference, namespace);
            Ok(Upsert::Created)
        }
        Err(e) if e.is_already_exists() => {
            store.replace_object(gvk, &replica).await?;
            debug!("Updated replica of {} in namespace {}", reference, namespace);
            Ok(Upsert::Updated)
        }
        Err(e) => Err(e),
    }
}

/// Copy a reference object into `namespace`, dropping everything the API server assigns
pub fn build_replica(source: &DynamicObject, reference: &Reference, namespace: &str) -> DynamicObject {
    let mut replica_annotations: BTreeMap<String, String> = source
        .metadata
        .annotations
        .as_ref()
        .map(|a| {
            a.iter()
                .filter(|(k, _)| {
                    !k.starts_with(annotations::PREFIX) && k.as_str() != annotations::LAST_APPLIED
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    replica_annotations.insert(
        annotations::REPLICATED_FROM.to_string(),
        reference.replicated_from(),
    );

    let mut data = source.data.clone();
    if let Some(fields) = data.as_object_mut() {
        fields.remove("status");
    }

    DynamicObject {
        types: Some(TypeMeta {
            api_version: reference.api_version(),
            kind: reference.kind.clone(),
        }),
        metadata: ObjectMeta {
            name: Some(reference.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: source.metadata.labels.clone(),
            annotations: Some(replica_annotations),
            ..Default::default()
        },
        data,
    }
}
