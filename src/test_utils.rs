// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory test doubles for the object cache and the import service.

use crate::constants::CONFIG_DATA_KEY;
use crate::error::{ImportError, OperatorError};
use crate::kubernetes::ObjectCache;
use crate::reconcilers::ImportService;
use crate::types::RealmImport;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use kube::runtime::reflector::ObjectRef;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// Build a ConfigMap carrying `payload` under the `configData` key
pub fn config_map(name: &str, namespace: &str, payload: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            CONFIG_DATA_KEY.to_string(),
            payload.to_string(),
        )])),
        ..Default::default()
    }
}

/// Object cache for the `default` namespace with a manually controlled sync flag.
#[derive(Clone)]
pub struct FakeCache {
    objects: Arc<Mutex<BTreeMap<String, Arc<ConfigMap>>>>,
    lookups: Arc<AtomicUsize>,
    synced: Arc<watch::Sender<bool>>,
}

impl FakeCache {
    pub fn new() -> Self {
        let (synced, _) = watch::channel(false);
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            lookups: Arc::new(AtomicUsize::new(0)),
            synced: Arc::new(synced),
        }
    }

    pub fn insert(&self, config_map: ConfigMap) {
        let name = config_map.metadata.name.clone().unwrap_or_default();
        self.objects
            .lock()
            .unwrap()
            .insert(name, Arc::new(config_map));
    }

    pub fn remove(&self, name: &str) {
        self.objects.lock().unwrap().remove(name);
    }

    pub fn mark_synced(&self) {
        self.synced.send_replace(true);
    }

    /// Number of `get_by_name` calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for FakeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectCache for FakeCache {
    fn list_namespace(&self, namespace: &str) -> Vec<ObjectRef<ConfigMap>> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .map(|name| ObjectRef::new(name).within(namespace))
            .collect()
    }

    fn get_by_name(&self, name: &str) -> Option<Arc<ConfigMap>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().get(name).cloned()
    }

    fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    async fn wait_until_synced(&self) -> Result<(), OperatorError> {
        let mut synced = self.synced.subscribe();
        synced
            .wait_for(|done| *done)
            .await
            .map(|_| ())
            .map_err(|_closed| OperatorError::CacheStopped)
    }
}

/// Import service that records every call and can be told to fail.
///
/// Successful imports are also sent on a channel so tests can wait for them.
#[derive(Clone)]
pub struct RecordingImportService {
    applied: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<VecDeque<ImportError>>>,
    attempts: Arc<AtomicUsize>,
    in_flight: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<String>,
}

impl RecordingImportService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            applied: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            attempts: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicBool::new(false)),
            overlapped: Arc::new(AtomicBool::new(false)),
            tx,
        };
        (service, rx)
    }

    /// Make the next call fail with `error`; queued failures are used in order
    pub fn fail_next(&self, error: ImportError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Realm names of successful imports, in call order
    pub fn applied_realms(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    /// Total number of calls, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether two calls were ever in progress at the same time
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

impl ImportService for RecordingImportService {
    async fn apply(&self, realm: &RealmImport) -> Result<(), ImportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        self.in_flight.store(false, Ordering::SeqCst);

        let failure = self.failures.lock().unwrap().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        self.applied.lock().unwrap().push(realm.realm.clone());
        let _ = self.tx.send(realm.realm.clone());
        Ok(())
    }
}
