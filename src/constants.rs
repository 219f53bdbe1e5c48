// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation keys used on replicas
pub mod annotations {
    /// Prefix of every annotation owned by the operator; never copied from a reference
    pub const PREFIX: &str = "sync.geeko.me/";
    /// Points back at the reference a replica was copied from (`<namespace>/<name>`)
    pub const REPLICATED_FROM: &str = "sync.geeko.me/replicated-from";
    /// Written by `kubectl apply`, embeds the reference's own namespace
    pub const LAST_APPLIED: &str = "kubectl.kubernetes.io/last-applied-configuration";
}

/// Finalizer marker guarding SyncObject deletion until replicas are gone
pub const FINALIZER: &str = "sync.geeko.me/finalizer";

/// The field manager recorded on every write
pub const OPERATOR_NAME: &str = "sync-operator";

/// Resync interval used when a SyncObject does not declare one
pub const DEFAULT_INTERVAL: &str = "10h";

/// CRD polling configuration
pub mod crd {
    pub const GROUP: &str = "sync.geeko.me";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "SyncObject";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
