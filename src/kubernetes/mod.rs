// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, resource resolution, and store access.

pub mod crd;
pub mod namespaces;
pub mod registry;
pub mod store;

pub use crd::wait_for_syncobject_crd;
pub use namespaces::list_namespace_names;
pub use registry::ResourceRegistry;
pub use store::{KubeStore, ObjectStore};
