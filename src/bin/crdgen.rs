// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prints the SyncObject CustomResourceDefinition as YAML.

use kube::CustomResourceExt;
use sync_operator::types::SyncObject;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&SyncObject::crd())?);
    Ok(())
}
