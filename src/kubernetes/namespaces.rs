// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace selection utilities

use crate::constants::DEFAULT_NAMESPACE;
use tracing::info;

/// Pick the namespace to watch: the configured one, else the client's
/// default namespace, else `default`.
pub fn resolve_namespace(configured: Option<&str>, client_default: &str) -> String {
    if let Some(namespace) = configured {
        return namespace.to_string();
    }

    if client_default.is_empty() {
        info!("No namespace found via config, assuming {}", DEFAULT_NAMESPACE);
        return DEFAULT_NAMESPACE.to_string();
    }

    client_default.to_string()
}
