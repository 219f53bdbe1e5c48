// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONCURRENCY: u16 = 4;
const DEFAULT_SYNC_PARALLELISM: usize = 8;
const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of SyncObjects reconciled at the same time
    pub concurrency: u16,
    /// Number of namespaces written concurrently within one pass
    pub sync_parallelism: usize,
    /// Delay before a failed pass is retried
    pub error_requeue: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let concurrency = parse_var("RECONCILE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let sync_parallelism = parse_var("SYNC_PARALLELISM", DEFAULT_SYNC_PARALLELISM)?;
        let error_requeue_secs = parse_var("ERROR_REQUEUE_SECONDS", DEFAULT_ERROR_REQUEUE_SECS)?;

        Ok(Config {
            concurrency: concurrency.max(1),
            sync_parallelism: sync_parallelism.max(1),
            error_requeue: Duration::from_secs(error_requeue_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            concurrency: DEFAULT_CONCURRENCY,
            sync_parallelism: DEFAULT_SYNC_PARALLELISM,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, value)),
        Err(_) => Ok(default),
    }
}
