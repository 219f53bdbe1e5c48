// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace listing utilities

use crate::error::{Result, SyncError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, instrument};

/// List the names of all namespaces in the cluster
#[instrument(skip(client))]
pub async fn list_namespace_names(client: &Client) -> Result<Vec<String>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let list = namespaces
        .list(&ListParams::default())
        .await
        .map_err(|e| SyncError::NamespaceError(e.to_string()))?;

    let names: Vec<String> = list.items.iter().map(|ns| ns.name_any()).collect();
    debug!("Found {} namespaces", names.len());

    Ok(names)
}
