// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for the ConfigMap cache and namespace selection.

pub mod cache;
pub mod namespaces;

pub use cache::{config_map_cache, watch_config_maps, ConfigMapCache, ConfigMapInformer, ObjectCache};
pub use namespaces::resolve_namespace;
