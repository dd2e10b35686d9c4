// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMap controller - owns the work queue and the single reconcile worker.

use crate::error::{OperatorError, Result};
use crate::kubernetes::ObjectCache;
use crate::reconcilers::{ImportService, Reconciler};
use crate::sync::queue::{EventQueue, QueueHandle};
use crate::types::ResourceKey;
use std::collections::VecDeque;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle of a [`Controller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Queue allocated, nothing subscribed yet
    Created,
    /// A change subscription feeds the queue
    Watching,
    /// Waiting for the cache's initial sync
    Syncing,
    /// Draining the queue
    Running,
    Stopped,
}

/// Drives reconciliation of the ConfigMaps in one namespace.
///
/// Change notifications only carry keys; every key is resolved against the
/// cache when it is dequeued, so stale or duplicate keys are harmless.
pub struct Controller<C, I> {
    cache: C,
    reconciler: Reconciler<I>,
    namespace: String,
    queue: EventQueue,
    producer: QueueHandle,
    state: watch::Sender<ControllerState>,
}

/// The running half of a controller: a single worker draining the queue
struct Worker<C, I> {
    cache: C,
    reconciler: Reconciler<I>,
    namespace: String,
    queue: EventQueue,
    /// Keys of objects that existed when the cache synced
    backlog: VecDeque<String>,
    state: watch::Sender<ControllerState>,
}

impl<C: ObjectCache, I: ImportService> Controller<C, I> {
    pub fn new(cache: C, reconciler: Reconciler<I>, namespace: &str, queue_capacity: usize) -> Self {
        let (queue, producer) = EventQueue::bounded(queue_capacity);
        let (state, _) = watch::channel(ControllerState::Created);

        Self {
            cache,
            reconciler,
            namespace: namespace.to_string(),
            queue,
            producer,
            state,
        }
    }

    /// Register a change subscription; the returned handle feeds this controller's queue
    pub fn subscribe(&self) -> QueueHandle {
        set_state(&self.state, ControllerState::Watching);
        self.producer.clone()
    }

    /// Observe lifecycle transitions
    pub fn state(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Wait for the cache to sync, then reconcile queued keys until shutdown
    /// is requested or an unrecoverable error occurs.
    pub async fn start(self, shutdown: CancellationToken) -> Result<()> {
        info!("Starting ConfigMap controller for namespace {}", self.namespace);

        let Controller {
            cache,
            reconciler,
            namespace,
            queue,
            producer,
            state,
        } = self;
        let subscribed = *state.borrow() != ControllerState::Created;

        // Only subscriptions may keep the queue open from here on
        drop(producer);

        let mut worker = Worker {
            cache,
            reconciler,
            namespace,
            queue,
            backlog: VecDeque::new(),
            state,
        };

        let result = if subscribed {
            worker.run(&shutdown).await
        } else {
            Err(OperatorError::NotSubscribed)
        };

        set_state(&worker.state, ControllerState::Stopped);
        match &result {
            Ok(()) => info!("ConfigMap controller stopped"),
            Err(e) => error!("ConfigMap controller failed: {}", e),
        }
        result
    }
}

impl<C: ObjectCache, I: ImportService> Worker<C, I> {
    async fn run(&mut self, shutdown: &CancellationToken) -> Result<()> {
        set_state(&self.state, ControllerState::Syncing);
        if !self.cache.has_synced() {
            info!("Waiting for ConfigMap cache to sync...");
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Shutdown requested before ConfigMap cache synced");
                return Ok(());
            }
            synced = self.cache.wait_until_synced() => synced?,
        }

        self.bootstrap();
        set_state(&self.state, ControllerState::Running);

        while let Some(key) = self.next_key(shutdown).await? {
            self.process_key(&key, shutdown).await?;
        }

        Ok(())
    }

    /// Queue every object already in the cache so it is reconciled once
    fn bootstrap(&mut self) {
        let existing = self.cache.list_namespace(&self.namespace);
        info!("ConfigMap cache synced, {} existing object(s)", existing.len());

        self.backlog.extend(
            existing
                .into_iter()
                .map(|r| ResourceKey::new(&self.namespace, r.name).to_string()),
        );
    }

    /// Next key to process, or `None` once shutdown is requested
    async fn next_key(&mut self, shutdown: &CancellationToken) -> Result<Option<String>> {
        if shutdown.is_cancelled() {
            return Ok(None);
        }
        if let Some(key) = self.backlog.pop_front() {
            return Ok(Some(key));
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Ok(None),
            key = self.queue.dequeue() => key.map(Some),
        }
    }

    #[instrument(skip(self, shutdown))]
    async fn process_key(&self, key: &str, shutdown: &CancellationToken) -> Result<()> {
        debug!("Got {}", key);

        let key: ResourceKey = match key.parse() {
            Ok(key) => key,
            Err(e) => {
                warn!("{}, skipping", e);
                return Ok(());
            }
        };

        if key.namespace() != self.namespace {
            warn!("{} is outside watched namespace {}, skipping", key, self.namespace);
            return Ok(());
        }

        let Some(config_map) = self.cache.get_by_name(key.name()) else {
            info!("ConfigMap {} in work queue no longer exists", key);
            return Ok(());
        };

        match self.reconciler.reconcile(&config_map, shutdown).await {
            Err(e @ OperatorError::Decode { .. }) => {
                error!("{}", e);
                Ok(())
            }
            other => other,
        }
    }
}

fn set_state(tx: &watch::Sender<ControllerState>, state: ControllerState) {
    tx.send_replace(state);
    debug!("Controller state: {:?}", state);
}
