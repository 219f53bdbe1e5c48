// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace selection, replica synchronization, and cleanup logic.

pub mod cleanup;
pub mod namespaces;
pub mod replicas;

pub use cleanup::{cleanup_replicas, delete_all_replicas, delete_replica, CleanupReport};
pub use namespaces::{select_namespaces, NamespaceSelection};
pub use replicas::{build_replica, sync_replicas, upsert_replica, SyncReport, Upsert};
