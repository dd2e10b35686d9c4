// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the cache, queue and reconciler.

pub mod key;
pub mod realm;

pub use key::{object_key, ResourceKey};
pub use realm::{KeycloakImport, RealmImport};
