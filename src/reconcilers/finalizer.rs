// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finalizer handling - keeps a SyncObject around until its replicas are removed.

use crate::error::Result;
use crate::kubernetes::ObjectStore;
use crate::sync::delete_all_replicas;
use crate::types::SyncObject;
use kube::ResourceExt;
use tracing::{debug, info, instrument};

/// Deletion state of a SyncObject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not being deleted
    Active,
    /// Deletion requested, our finalizer still holds the object
    Terminating,
    /// Deletion requested and nothing left for us to do
    Released,
}

/// Whether the rest of the reconcile pass should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Continue,
    Stop,
}

pub fn lifecycle(declaration: &SyncObject) -> Lifecycle {
    match (declaration.is_being_deleted(), declaration.has_finalizer()) {
        (false, _) => Lifecycle::Active,
        (true, true) => Lifecycle::Terminating,
        (true, false) => Lifecycle::Released,
    }
}

/// Register the finalizer on live SyncObjects, and tear down replicas of deleted ones.
///
/// `declaration` is updated in place with whatever the store returned, so a
/// later write in the same pass carries the current resourceVersion.
#[instrument(skip(store, declaration), fields(syncobject = %declaration.name_any()))]
pub async fn handle_finalizer<S: ObjectStore>(
    store: &S,
    declaration: &mut SyncObject,
    parallelism: usize,
) -> Result<GuardOutcome> {
    match lifecycle(declaration) {
        Lifecycle::Active if declaration.has_finalizer() => Ok(GuardOutcome::Continue),
        Lifecycle::Active => {
            declaration.add_finalizer();
            let updated = store.replace_declaration(declaration).await?;
            *declaration = updated;
            info!("Registered finalizer");
            Ok(GuardOutcome::Continue)
        }
        Lifecycle::Terminating => {
            if declaration.spec.disable_finalizer {
                info!("Finalizer disabled, leaving replicas in place");
            } else {
                delete_all_replicas(store, &declaration.spec.reference, parallelism).await?;
            }

            declaration.remove_finalizer();
            let updated = store.replace_declaration(declaration).await?;
            *declaration = updated;
            info!("Released finalizer");
            Ok(GuardOutcome::Stop)
        }
        Lifecycle::Released => {
            debug!("SyncObject is being deleted without our finalizer, nothing to do");
            Ok(GuardOutcome::Stop)
        }
    }
}
