// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_INTERVAL, FINALIZER};
use crate::error::{Result, SyncError};
use kube::{core::GroupVersionKind, CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Declares a reference object and the namespaces it is replicated into.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "sync.geeko.me", version = "v1alpha1", kind = "SyncObject")]
#[kube(status = "SyncObjectStatus")]
#[kube(shortname = "syncobj")]
#[kube(printcolumn = r#"{"name":"Kind","type":"string","jsonPath":".spec.reference.kind"}"#)]
#[kube(printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.reference.namespace"}"#)]
#[serde(rename_all = "camelCase")]
pub struct SyncObjectSpec {
    pub reference: Reference,
    /// Namespaces receiving a replica, empty means every namespace
    #[serde(default)]
    pub target_namespaces: Vec<String>,
    /// Namespaces never receiving a replica, even when listed as target
    #[serde(default)]
    pub ignore_namespaces: Vec<String>,
    /// Leave replicas behind when the SyncObject is deleted
    #[serde(default)]
    pub disable_finalizer: bool,
    /// Resync interval, e.g. `10h`, `1h30m` or `45s`
    #[serde(default = "default_interval")]
    pub interval: String,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

/// Identifies the object that is replicated
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct Reference {
    /// API group, empty for the core group
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl Reference {
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Value of the provenance annotation stamped on every replica
    pub fn replicated_from(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.namespace, self.name, self.kind)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncObjectStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Namespaces holding an up to date replica after the last pass
    #[serde(default)]
    pub synced_namespaces: Vec<String>,
    /// Namespaces where writing or removing a replica failed during the last pass
    #[serde(default)]
    pub failed_namespaces: Vec<String>,
}

impl SyncObject {
    pub fn has_finalizer(&self) -> bool {
        self.finalizers().iter().any(|f| f == FINALIZER)
    }

    pub fn add_finalizer(&mut self) {
        if !self.has_finalizer() {
            self.finalizers_mut().push(FINALIZER.to_string());
        }
    }

    pub fn remove_finalizer(&mut self) {
        self.finalizers_mut().retain(|f| f != FINALIZER);
    }

    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Interval after which a converged SyncObject is reconciled again
    pub fn requeue_interval(&self) -> Duration {
        match parse_interval(&self.spec.interval) {
            Ok(interval) => interval,
            Err(e) => {
                warn!(
                    "SyncObject {} has an unusable interval, falling back to {}: {}",
                    self.name_any(),
                    DEFAULT_INTERVAL,
                    e
                );
                default_requeue_interval()
            }
        }
    }
}

fn default_requeue_interval() -> Duration {
    Duration::from_secs(10 * 60 * 60)
}

/// Parse a duration such as `10h`, `1h30m`, `10h0m0s`, `250ms` or `100us`.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    let interval = humantime::parse_duration(value)
        .map_err(|e| SyncError::InvalidInterval(format!("{}: {}", value, e)))?;
    if interval.is_zero() {
        return Err(SyncError::InvalidInterval(format!("{} is zero", value)));
    }

    Ok(interval)
}
