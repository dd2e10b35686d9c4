// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local ConfigMap cache backed by a kube reflector store.
//!
//! [`ConfigMapInformer`] is the write side: it applies watch events to the
//! store and publishes change notifications into the work queue.
//! [`ConfigMapCache`] is the read side used by the controller.

use crate::error::{OperatorError, Result};
use crate::sync::{ChangeEvent, ChangeKind, QueueHandle};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::reflector::{self, store::Writer, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Read access to an eventually-consistent mirror of the watched ConfigMaps
pub trait ObjectCache: Send + Sync {
    /// References to every cached object in `namespace`, ordered by name
    fn list_namespace(&self, namespace: &str) -> Vec<ObjectRef<ConfigMap>>;

    /// Current state of the named object in the watched namespace
    fn get_by_name(&self, name: &str) -> Option<Arc<ConfigMap>>;

    /// Whether the cache has seen the full initial listing
    fn has_synced(&self) -> bool;

    /// Wait until the initial listing has been applied
    fn wait_until_synced(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Read side of the ConfigMap cache
#[derive(Clone)]
pub struct ConfigMapCache {
    store: Store<ConfigMap>,
    namespace: String,
    synced: watch::Receiver<bool>,
}

/// Write side of the ConfigMap cache, driven by a watch stream
pub struct ConfigMapInformer {
    writer: Writer<ConfigMap>,
    reader: Store<ConfigMap>,
    namespace: String,
    synced: watch::Sender<bool>,
    /// Changes seen during a re-list, published once the re-list is applied
    pending: Vec<ChangeEvent>,
}

/// Create a cache for ConfigMaps in `namespace` together with the informer that fills it
pub fn config_map_cache(namespace: &str) -> (ConfigMapCache, ConfigMapInformer) {
    let (store, writer) = reflector::store();
    let (synced_tx, synced_rx) = watch::channel(false);

    let cache = ConfigMapCache {
        store: store.clone(),
        namespace: namespace.to_string(),
        synced: synced_rx,
    };
    let informer = ConfigMapInformer {
        writer,
        reader: store,
        namespace: namespace.to_string(),
        synced: synced_tx,
        pending: Vec::new(),
    };

    (cache, informer)
}

/// Watch ConfigMaps in a single namespace, retrying failed watches with backoff
pub fn watch_config_maps(
    client: Client,
    namespace: &str,
) -> impl Stream<Item = std::result::Result<watcher::Event<ConfigMap>, watcher::Error>> + Send {
    let config_maps: Api<ConfigMap> = Api::namespaced(client, namespace);
    watcher(config_maps, WatcherConfig::default()).default_backoff()
}

impl ObjectCache for ConfigMapCache {
    fn list_namespace(&self, namespace: &str) -> Vec<ObjectRef<ConfigMap>> {
        let mut refs: Vec<ObjectRef<ConfigMap>> = self
            .store
            .state()
            .iter()
            .filter(|cm| cm.namespace().as_deref() == Some(namespace))
            .map(|cm| ObjectRef::new(&cm.name_any()).within(namespace))
            .collect();
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        refs
    }

    fn get_by_name(&self, name: &str) -> Option<Arc<ConfigMap>> {
        self.store
            .get(&ObjectRef::new(name).within(&self.namespace))
    }

    fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    async fn wait_until_synced(&self) -> Result<()> {
        let mut synced = self.synced.clone();
        synced
            .wait_for(|done| *done)
            .await
            .map(|_| ())
            .map_err(|_closed| OperatorError::CacheStopped)
    }
}

impl ConfigMapInformer {
    /// Apply watch events to the store and publish changes into `queue` until
    /// the stream ends or shutdown is requested.
    pub async fn run<S>(mut self, events: S, queue: QueueHandle, shutdown: CancellationToken) -> Result<()>
    where
        S: Stream<Item = std::result::Result<watcher::Event<ConfigMap>, watcher::Error>>,
    {
        info!("Starting ConfigMap informer for namespace {}", self.namespace);
        let mut events = pin!(events);

        'watch: loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = events.next() => next,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    warn!("ConfigMap watch error: {}", e);
                    continue;
                }
                None => {
                    warn!("ConfigMap watch stream ended");
                    return Ok(());
                }
            };

            for change in self.apply(&event) {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break 'watch,
                    sent = queue.notify(change) => sent?,
                }
            }
        }

        info!("ConfigMap informer stopped");
        Ok(())
    }

    fn is_synced(&self) -> bool {
        *self.synced.borrow()
    }

    fn change_kind(&self, config_map: &ConfigMap) -> ChangeKind {
        let key = ObjectRef::new(&config_map.name_any()).within(&self.namespace);
        if self.reader.get(&key).is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Added
        }
    }

    fn cached_names(&self) -> BTreeSet<String> {
        self.reader.state().iter().map(|cm| cm.name_any()).collect()
    }

    /// Apply one event to the store and return the changes it produced.
    ///
    /// Objects from the first listing are not published; the controller
    /// bootstraps them from the store once it has synced. Objects from later
    /// re-lists are published after the whole listing is applied, so the
    /// worker never resolves a key against the pre-list state.
    fn apply(&mut self, event: &watcher::Event<ConfigMap>) -> Vec<ChangeEvent> {
        let mut changes = Vec::new();

        match event {
            watcher::Event::Apply(cm) => {
                changes.push(ChangeEvent::for_object(cm, self.change_kind(cm)));
                self.writer.apply_watcher_event(event);
            }
            watcher::Event::Delete(cm) => {
                self.writer.apply_watcher_event(event);
                changes.push(ChangeEvent::for_object(cm, ChangeKind::Deleted));
            }
            watcher::Event::Init => {
                debug!("ConfigMap listing started");
                self.pending.clear();
                self.writer.apply_watcher_event(event);
            }
            watcher::Event::InitApply(cm) => {
                if self.is_synced() {
                    self.pending.push(ChangeEvent::for_object(cm, self.change_kind(cm)));
                }
                self.writer.apply_watcher_event(event);
            }
            watcher::Event::InitDone => {
                let before = self.cached_names();
                self.writer.apply_watcher_event(event);

                if self.is_synced() {
                    let after = self.cached_names();
                    changes.append(&mut self.pending);
                    changes.extend(before.difference(&after).map(|name| ChangeEvent {
                        key: format!("{}/{}", self.namespace, name),
                        kind: ChangeKind::Deleted,
                    }));
                    debug!("ConfigMap re-list applied, {} change(s)", changes.len());
                } else {
                    self.synced.send_replace(true);
                    info!("ConfigMap cache synced with {} object(s)", self.reader.state().len());
                }
            }
        }

        changes
    }
}
