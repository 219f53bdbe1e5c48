// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflicting write to {0}, object was modified concurrently")]
    Conflict(String),

    #[error("Failed to list namespaces: {0}")]
    NamespaceError(String),

    #[error("Replica cleanup failed in namespaces: {}", .0.join(", "))]
    CleanupFailed(Vec<String>),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SyncError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
