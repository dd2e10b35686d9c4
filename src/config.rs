// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{queue, retry};
use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace to watch; falls back to the client's default namespace
    pub namespace: Option<String>,
    /// Format of the `configData` payload
    pub import_file_type: ImportFileType,
    pub queue_capacity: usize,
    pub apply_failure_policy: ApplyFailurePolicy,
}

/// Serialization format of realm documents stored in ConfigMaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFileType {
    Auto,
    Json,
    Yaml,
}

impl FromStr for ImportFileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ImportFileType::Auto),
            "json" => Ok(ImportFileType::Json),
            "yaml" | "yml" => Ok(ImportFileType::Yaml),
            other => bail!("unknown import file type '{}'", other),
        }
    }
}

impl fmt::Display for ImportFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportFileType::Auto => "auto",
            ImportFileType::Json => "json",
            ImportFileType::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// What the reconciler does when the import service fails to apply a realm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyFailurePolicy {
    /// Stop the controller on the first failure
    FailFast,
    /// Log the failure and move on to the next request
    Skip,
    /// Retry retryable failures with exponential backoff, then skip
    Retry(RetryPolicy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry::DEFAULT_ATTEMPTS,
            initial_backoff: Duration::from_secs(retry::BACKOFF_SECS),
            max_backoff: Duration::from_secs(retry::MAX_BACKOFF_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let import_file_type = match lookup("IMPORT_FILE_TYPE") {
            Some(value) => value.parse().context("Invalid IMPORT_FILE_TYPE")?,
            None => ImportFileType::Yaml,
        };

        let queue_capacity = parse_or(&lookup, "QUEUE_CAPACITY", queue::DEFAULT_CAPACITY)?;
        if queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than zero");
        }

        let apply_failure_policy = match lookup("APPLY_FAILURE_POLICY").as_deref() {
            None | Some("fail-fast") => ApplyFailurePolicy::FailFast,
            Some("skip") => ApplyFailurePolicy::Skip,
            Some("retry") => {
                let max_attempts = parse_or(&lookup, "APPLY_RETRY_ATTEMPTS", retry::DEFAULT_ATTEMPTS)?;
                if max_attempts == 0 {
                    bail!("APPLY_RETRY_ATTEMPTS must be greater than zero");
                }
                let backoff = parse_or(&lookup, "APPLY_RETRY_BACKOFF_SECS", retry::BACKOFF_SECS)?;
                let max_backoff =
                    parse_or(&lookup, "APPLY_RETRY_MAX_BACKOFF_SECS", retry::MAX_BACKOFF_SECS)?;
                ApplyFailurePolicy::Retry(RetryPolicy {
                    max_attempts,
                    initial_backoff: Duration::from_secs(backoff),
                    max_backoff: Duration::from_secs(max_backoff.max(backoff)),
                })
            }
            Some(other) => bail!("Invalid APPLY_FAILURE_POLICY '{}'", other),
        };

        Ok(Config {
            namespace,
            import_file_type,
            queue_capacity,
            apply_failure_policy,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, key)),
        None => Ok(default),
    }
}
