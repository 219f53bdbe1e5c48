// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod finalizer;
pub mod syncobject;

pub use finalizer::{handle_finalizer, lifecycle, GuardOutcome, Lifecycle};
pub use syncobject::{PassOutcome, SyncObjectReconciler};
