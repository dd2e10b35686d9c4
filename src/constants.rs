// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// ConfigMap data entry holding the serialized realm document
pub const CONFIG_DATA_KEY: &str = "configData";

/// The operator name used in logs and spans
pub const OPERATOR_NAME: &str = "realm-operator";

/// Namespace used when neither configuration nor the client provide one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Work queue configuration
pub mod queue {
    /// Maximum number of pending resource keys before producers block
    pub const DEFAULT_CAPACITY: usize = 1024;
}

/// Apply retry configuration, used with the `retry` failure policy
pub mod retry {
    /// Total number of apply attempts per realm
    pub const DEFAULT_ATTEMPTS: u32 = 5;
    /// Initial backoff in seconds between attempts
    pub const BACKOFF_SECS: u64 = 2;
    /// Maximum backoff in seconds (exponential backoff cap)
    pub const MAX_BACKOFF_SECS: u64 = 60;
}
