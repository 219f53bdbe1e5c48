// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! SyncObject reconciler - converges replicas of a reference object across namespaces.

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::kubernetes::{KubeStore, ObjectStore};
use crate::reconcilers::finalizer::{handle_finalizer, GuardOutcome};
use crate::sync::{cleanup_replicas, select_namespaces, sync_replicas};
use crate::types::{SyncObject, SyncObjectStatus};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, Controller},
    Api, ResourceExt,
};
use kube_runtime::controller::Config as ControllerConfig;
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How a reconcile pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The SyncObject no longer exists
    Absent,
    /// The SyncObject is being deleted and the finalizer guard ended the pass
    Released,
    Converged {
        synced: Vec<String>,
        failed: Vec<String>,
        requeue_after: Duration,
    },
}

impl PassOutcome {
    pub fn action(&self) -> Action {
        match self {
            PassOutcome::Converged { requeue_after, .. } => Action::requeue(*requeue_after),
            PassOutcome::Absent | PassOutcome::Released => Action::await_change(),
        }
    }
}

pub struct SyncObjectReconciler<S> {
    store: S,
    config: Config,
}

impl<S: ObjectStore> SyncObjectReconciler<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Run one reconcile pass for the SyncObject called `name`.
    ///
    /// Every step is safe to repeat, so any error simply means the whole pass is retried.
    #[instrument(skip(self))]
    pub async fn reconcile_pass(&self, name: &str) -> Result<PassOutcome> {
        let parallelism = self.config.sync_parallelism;

        let Some(mut declaration) = self.store.get_declaration(name).await? else {
            debug!("SyncObject {} not found, nothing to do", name);
            return Ok(PassOutcome::Absent);
        };

        if handle_finalizer(&self.store, &mut declaration, parallelism).await? == GuardOutcome::Stop {
            return Ok(PassOutcome::Released);
        }

        let spec = &declaration.spec;
        let reference = &spec.reference;
        info!("Reconciling SyncObject {} for reference {}", name, reference);

        let all_namespaces = self.store.list_namespaces().await?;
        let selection = select_namespaces(
            &all_namespaces,
            &reference.namespace,
            &spec.target_namespaces,
            &spec.ignore_namespaces,
        );
        debug!(
            "Selected {} target and {} non-target namespaces",
            selection.targets.len(),
            selection.non_targets.len()
        );

        // leftovers, e.g. after targetNamespaces shrank
        let cleanup =
            cleanup_replicas(&self.store, reference, &selection.non_targets, parallelism).await;

        let report = sync_replicas(&self.store, reference, &selection.targets, parallelism).await?;

        let mut failed = report.failed.clone();
        failed.extend(cleanup.failed);
        failed.sort();

        self.record_status(
            &declaration,
            SyncObjectStatus {
                observed_generation: declaration.metadata.generation,
                synced_namespaces: report.synced.clone(),
                failed_namespaces: failed.clone(),
            },
        )
        .await;

        Ok(PassOutcome::Converged {
            synced: report.synced,
            failed,
            requeue_after: declaration.requeue_interval(),
        })
    }

    /// Write the status only when it changed, a status write triggers another pass
    async fn record_status(&self, declaration: &SyncObject, status: SyncObjectStatus) {
        if declaration.status.as_ref() == Some(&status) {
            debug!("Status of SyncObject {} unchanged", declaration.name_any());
            return;
        }

        if let Err(e) = self
            .store
            .update_status(&declaration.name_any(), &status)
            .await
        {
            warn!(
                "Failed to update status of SyncObject {}: {}",
                declaration.name_any(),
                e
            );
        }
    }
}

impl SyncObjectReconciler<KubeStore> {
    pub async fn run(self) -> anyhow::Result<()> {
        let syncobjects: Api<SyncObject> = Api::all(self.store.client().clone());
        let controller_config = ControllerConfig::default().concurrency(self.config.concurrency);
        let context = Arc::new(self);

        Controller::new(syncobjects, WatcherConfig::default())
            .with_config(controller_config)
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled SyncObject: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("SyncObject controller stopped");
        Ok(())
    }
}

async fn reconcile(
    syncobject: Arc<SyncObject>,
    ctx: Arc<SyncObjectReconciler<KubeStore>>,
) -> Result<Action> {
    let outcome = ctx.reconcile_pass(&syncobject.name_any()).await?;
    Ok(outcome.action())
}

fn error_policy(
    syncobject: Arc<SyncObject>,
    error: &SyncError,
    ctx: Arc<SyncObjectReconciler<KubeStore>>,
) -> Action {
    error!(
        "Reconciliation of SyncObject {} failed: {}",
        syncobject.name_any(),
        error
    );
    Action::requeue(ctx.config.error_requeue)
}
