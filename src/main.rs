// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::process::ExitCode;
use std::time::Instant;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use realm_operator::config::Config;
use realm_operator::constants::OPERATOR_NAME;
use realm_operator::kubernetes::{config_map_cache, resolve_namespace, watch_config_maps};
use realm_operator::reconcilers::{ConfigMapImportProvider, DryRunImportService, Reconciler};
use realm_operator::sync::Controller;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let started = Instant::now();
    let result = run().await;
    info!("{} ran for {:.3?}", OPERATOR_NAME, started.elapsed());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    info!("Starting {}", OPERATOR_NAME);

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: import_file_type={}, queue_capacity={}, apply_failure_policy={:?}",
        config.import_file_type, config.queue_capacity, config.apply_failure_policy
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    let namespace = resolve_namespace(config.namespace.as_deref(), client.default_namespace());
    info!("Connected to Kubernetes cluster, watching namespace {}", namespace);

    let (cache, informer) = config_map_cache(&namespace);
    let reconciler = Reconciler::new(
        ConfigMapImportProvider::new(config.import_file_type),
        DryRunImportService,
        config.apply_failure_policy.clone(),
    );
    let controller = Controller::new(cache, reconciler, &namespace, config.queue_capacity);
    let queue = controller.subscribe();

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    // Run the informer and the controller until shutdown or the first failure
    tokio::try_join!(
        informer.run(watch_config_maps(client, &namespace), queue, shutdown.clone()),
        controller.start(shutdown.clone())
    )?;

    Ok(())
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
