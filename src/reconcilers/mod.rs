// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoding ConfigMaps into realm imports and applying them.

pub mod decode;
pub mod import;
pub mod realm;

pub use decode::ConfigMapImportProvider;
pub use import::{DryRunImportService, ImportService};
pub use realm::Reconciler;
