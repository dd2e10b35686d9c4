// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded FIFO work queue of resource keys.
//!
//! Producers block when the queue is full, so a burst of watch events applies
//! backpressure to the informer instead of dropping changes. Keys are not
//! deduplicated: the consumer always re-resolves current state.

use crate::error::{OperatorError, Result};
use crate::types::object_key;
use k8s_openapi::api::core::v1::ConfigMap;
use tokio::sync::mpsc;
use tracing::debug;

/// What happened to an object in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Deleted,
}

/// A cache change notification. Only the key is queued; the kind is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn for_object(config_map: &ConfigMap, kind: ChangeKind) -> Self {
        Self {
            key: object_key(config_map),
            kind,
        }
    }
}

/// Consumer side of the queue, owned by the controller
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::Receiver<String>,
}

/// Producer side of the queue, handed to change subscriptions
#[derive(Debug, Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<String>,
}

impl EventQueue {
    pub fn bounded(capacity: usize) -> (Self, QueueHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { rx }, QueueHandle { tx })
    }

    /// Wait for the oldest key. Fails once every producer is gone, since no
    /// further change can ever be delivered.
    pub async fn dequeue(&mut self) -> Result<String> {
        self.rx.recv().await.ok_or(OperatorError::QueueClosed)
    }
}

impl QueueHandle {
    /// Append a key, waiting for free capacity when the queue is full
    pub async fn enqueue(&self, key: String) -> Result<()> {
        if key.is_empty() {
            return Err(OperatorError::InvalidKey(key));
        }
        self.tx
            .send(key)
            .await
            .map_err(|_closed| OperatorError::QueueClosed)
    }

    /// Enqueue the key of a change notification
    pub async fn notify(&self, event: ChangeEvent) -> Result<()> {
        debug!("Going to enqueue key {} ({:?})", event.key, event.kind);
        self.enqueue(event.key).await
    }
}
