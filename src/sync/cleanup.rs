// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Idempotent replica removal

use crate::constants::annotations;
use crate::error::{Result, SyncError};
use crate::kubernetes::ObjectStore;
use crate::types::Reference;
use futures::{stream, StreamExt};
use kube::api::DynamicObject;
use tracing::{debug, error, info, instrument, warn};

/// Per-namespace results of [`cleanup_replicas`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Namespaces that no longer hold a replica
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl CleanupReport {
    /// Fail when any namespace could not be cleaned up
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.failed.is_empty() {
            Ok(self.removed)
        } else {
            Err(SyncError::CleanupFailed(self.failed))
        }
    }
}

fn is_replica_of(object: &DynamicObject, reference: &Reference) -> bool {
    object
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::REPLICATED_FROM))
        .is_some_and(|origin| *origin == reference.replicated_from())
}

/// Delete the replica of `reference` in `namespace`; an absent replica counts as deleted.
///
/// Objects sharing the reference's name without our provenance annotation are left alone.
pub async fn delete_replica<S: ObjectStore>(
    store: &S,
    reference: &Reference,
    namespace: &str,
) -> Result<()> {
    if namespace == reference.namespace {
        warn!("Refusing to delete the reference {} itself", reference);
        return Ok(());
    }

    match store
        .get_object(&reference.gvk(), namespace, &reference.name)
        .await
    {
        Ok(object) if !is_replica_of(&object, reference) => {
            warn!(
                "Object {}/{} was not replicated from {}, leaving it in place",
                namespace, reference.name, reference
            );
            return Ok(());
        }
        Ok(_) => {}
        Err(e) if e.is_not_found() => {
            debug!("No replica of {} in namespace {}", reference, namespace);
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    match store
        .delete_object(&reference.gvk(), namespace, &reference.name)
        .await
    {
        Ok(()) => {
            info!("Deleted replica of {} in namespace {}", reference, namespace);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            debug!("No replica of {} in namespace {}", reference, namespace);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Remove replicas from every given namespace without stopping at the first failure
#[instrument(skip(store, namespaces), fields(reference = %reference))]
pub async fn cleanup_replicas<S: ObjectStore>(
    store: &S,
    reference: &Reference,
    namespaces: &[String],
    parallelism: usize,
) -> CleanupReport {
    let mut results: Vec<(String, Result<()>)> = stream::iter(namespaces.iter().cloned())
        .map(move |namespace| async move {
            let result = delete_replica(store, reference, &namespace).await;
            (namespace, result)
        })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut report = CleanupReport::default();
    for (namespace, result) in results {
        match result {
            Ok(()) => report.removed.push(namespace),
            Err(e) => {
                error!(
                    "Failed to delete replica of {} in namespace {}: {}",
                    reference, namespace, e
                );
                report.failed.push(namespace);
            }
        }
    }

    report
}

/// Remove the replica from every namespace in the cluster except the reference's own
#[instrument(skip(store), fields(reference = %reference))]
pub async fn delete_all_replicas<S: ObjectStore>(
    store: &S,
    reference: &Reference,
    parallelism: usize,
) -> Result<()> {
    let namespaces: Vec<String> = store
        .list_namespaces()
        .await?
        .into_iter()
        .filter(|ns| *ns != reference.namespace)
        .collect();

    let removed = cleanup_replicas(store, reference, &namespaces, parallelism)
        .await
        .into_result()?;
    info!("Removed replicas of {} from {} namespaces", reference, removed.len());

    Ok(())
}
