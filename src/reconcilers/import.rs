// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Boundary to the identity system that realm imports are written into.

use crate::error::ImportError;
use crate::types::RealmImport;
use std::future::Future;
use tracing::info;

/// Applies a decoded realm to the target system.
///
/// Implementations must be idempotent: the controller may apply the same,
/// unchanged realm more than once.
pub trait ImportService: Send + Sync {
    fn apply(&self, realm: &RealmImport) -> impl Future<Output = Result<(), ImportError>> + Send;
}

/// Import service that only logs what it would import
#[derive(Debug, Clone, Default)]
pub struct DryRunImportService;

impl ImportService for DryRunImportService {
    async fn apply(&self, realm: &RealmImport) -> Result<(), ImportError> {
        info!(
            "Dry run: would import realm '{}' (checksum {}, {} client(s), {} group(s), {} user(s))",
            realm.realm,
            realm.checksum,
            realm.clients.len(),
            realm.groups.len(),
            realm.users.len()
        );
        Ok(())
    }
}
