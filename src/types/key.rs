// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace-qualified resource keys carried by the work queue.

use crate::error::OperatorError;
use kube::{Resource, ResourceExt};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '/';

/// A validated `namespace/name` key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    namespace: String,
    name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ResourceKey {
    type Err = OperatorError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), None) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(OperatorError::InvalidKey(key.to_string())),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, SEPARATOR, self.name)
    }
}

/// Compute the queue key of an object: `namespace/name`, or just `name`
/// for objects without a namespace.
pub fn object_key<K: Resource>(obj: &K) -> String {
    match obj.namespace() {
        Some(namespace) => format!("{}{}{}", namespace, SEPARATOR, obj.name_any()),
        None => obj.name_any(),
    }
}
