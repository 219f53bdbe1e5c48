// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Computes which namespaces should and should no longer hold a replica.

use std::collections::BTreeSet;

/// Result of [`select_namespaces`], both lists sorted and free of duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceSelection {
    /// Namespaces that must hold a replica
    pub targets: Vec<String>,
    /// Existing namespaces whose replica, if any, must be removed
    pub non_targets: Vec<String>,
}

/// Split the cluster's namespaces into target and non-target sets.
///
/// An empty `declared_targets` means every namespace. The reference namespace
/// is never part of either set, and `ignored` always wins over `declared_targets`.
pub fn select_namespaces(
    all_namespaces: &[String],
    reference_namespace: &str,
    declared_targets: &[String],
    ignored: &[String],
) -> NamespaceSelection {
    let candidates: BTreeSet<&str> = all_namespaces
        .iter()
        .map(String::as_str)
        .filter(|ns| *ns != reference_namespace)
        .collect();

    let provisional: BTreeSet<&str> = if declared_targets.is_empty() {
        candidates.clone()
    } else {
        declared_targets
            .iter()
            .map(String::as_str)
            .filter(|ns| *ns != reference_namespace)
            .collect()
    };

    let ignored: BTreeSet<&str> = ignored.iter().map(String::as_str).collect();
    let targets: BTreeSet<&str> = provisional.difference(&ignored).copied().collect();

    NamespaceSelection {
        targets: targets.iter().map(|ns| ns.to_string()).collect(),
        non_targets: candidates
            .difference(&targets)
            .map(|ns| ns.to_string())
            .collect(),
    }
}
