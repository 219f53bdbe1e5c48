// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sync_operator::config::Config;
use sync_operator::kubernetes::{wait_for_syncobject_crd, KubeStore, ResourceRegistry};
use sync_operator::reconcilers::SyncObjectReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting SyncObject operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: concurrency={}, sync_parallelism={}, error_requeue={:?}",
        config.concurrency, config.sync_parallelism, config.error_requeue
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for SyncObject CRD to become available...");
    wait_for_syncobject_crd(&client).await?;

    let store = KubeStore::new(client, ResourceRegistry::with_builtins());
    let reconciler = SyncObjectReconciler::new(store, config);

    info!("Starting SyncObject reconciler...");
    reconciler.run().await?;

    info!("Shutting down");
    Ok(())
}
