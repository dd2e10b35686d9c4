// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::ImportFileType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Invalid resource key: {0}")]
    InvalidKey(String),

    #[error("Failed to decode ConfigMap {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to import realm {realm}: {source}")]
    Import {
        realm: String,
        #[source]
        source: ImportError,
    },

    #[error("Work queue closed, no change subscription is alive")]
    QueueClosed,

    #[error("Object cache stopped before completing its initial sync")]
    CacheStopped,

    #[error("Controller started without a change subscription")]
    NotSubscribed,
}

/// Reasons a ConfigMap payload could not be turned into realm imports.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("no '{0}' entry in data")]
    MissingConfigData(&'static str),

    #[error("unsupported import file type '{0}'")]
    UnsupportedFileType(ImportFileType),

    #[error("payload contains no document")]
    Empty,

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an import service.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The target system could not be reached; trying again may succeed.
    #[error("target system unavailable: {0}")]
    Unavailable(String),

    /// The target system refused the request.
    #[error("import rejected: {0}")]
    Rejected(String),
}

impl ImportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImportError::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
