// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Realm reconciler - decodes a ConfigMap and applies its realms in order.

use crate::config::{ApplyFailurePolicy, RetryPolicy};
use crate::error::{OperatorError, Result};
use crate::reconcilers::decode::ConfigMapImportProvider;
use crate::reconcilers::import::ImportService;
use crate::types::{object_key, RealmImport};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

pub struct Reconciler<I> {
    provider: ConfigMapImportProvider,
    import_service: I,
    policy: ApplyFailurePolicy,
}

impl<I: ImportService> Reconciler<I> {
    pub fn new(provider: ConfigMapImportProvider, import_service: I, policy: ApplyFailurePolicy) -> Self {
        Self {
            provider,
            import_service,
            policy,
        }
    }

    /// Decode `config_map` and apply every realm it contains, one at a time.
    ///
    /// Nothing is applied when decoding fails. Apply failures are handled
    /// according to the configured [`ApplyFailurePolicy`]. Remaining realms
    /// are left alone once `shutdown` is cancelled.
    #[instrument(skip(self, config_map, shutdown), fields(config_map = %object_key(config_map)))]
    pub async fn reconcile(&self, config_map: &ConfigMap, shutdown: &CancellationToken) -> Result<()> {
        let import = self
            .provider
            .get(config_map)
            .map_err(|source| OperatorError::Decode {
                name: config_map.name_any(),
                source,
            })?;

        info!("Importing {} realm(s)", import.len());

        for (name, realm) in import.iter() {
            if shutdown.is_cancelled() {
                info!("Shutdown requested, not importing realm {}", name);
                break;
            }
            self.apply(name, realm, shutdown).await?;
        }

        Ok(())
    }

    async fn apply(&self, name: &str, realm: &RealmImport, shutdown: &CancellationToken) -> Result<()> {
        match &self.policy {
            ApplyFailurePolicy::FailFast => {
                self.import_service
                    .apply(realm)
                    .await
                    .map_err(|source| OperatorError::Import {
                        realm: name.to_string(),
                        source,
                    })?;
            }
            ApplyFailurePolicy::Skip => {
                if let Err(e) = self.import_service.apply(realm).await {
                    error!("Failed to import realm {}, skipping: {}", name, e);
                    return Ok(());
                }
            }
            ApplyFailurePolicy::Retry(retry) => {
                if !self.apply_with_retry(name, realm, retry, shutdown).await {
                    return Ok(());
                }
            }
        }

        info!("Successfully imported realm {}", name);
        Ok(())
    }

    /// Returns `false` when the realm was given up on
    async fn apply_with_retry(
        &self,
        name: &str,
        realm: &RealmImport,
        retry: &RetryPolicy,
        shutdown: &CancellationToken,
    ) -> bool {
        let mut attempt = 1;
        let mut backoff = retry.initial_backoff;

        loop {
            match self.import_service.apply(realm).await {
                Ok(()) => return true,
                Err(e) if e.is_retryable() && attempt < retry.max_attempts => {
                    warn!(
                        "Import of realm {} failed (attempt {}/{}): {}, retrying in {:?}...",
                        name, attempt, retry.max_attempts, e, backoff
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => {
                            warn!("Shutdown requested, abandoning import of realm {}", name);
                            return false;
                        }
                        _ = sleep(backoff) => {}
                    }

                    // Exponential backoff with max cap
                    backoff = backoff.saturating_mul(2).min(retry.max_backoff);
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Giving up on realm {} after {} attempt(s): {}",
                        name, attempt, e
                    );
                    return false;
                }
            }
        }
    }
}
