// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::PathBuf;

use crate::Scope;

/// An error returned while reading or updating a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to access manifest {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin} is not a valid manifest")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode manifest")]
    Encode(#[source] serde_json::Error),
    #[error("{field:?} not found in {scope}")]
    FieldNotFound { scope: Scope, field: String },
    #[error("component {0:?} not found in the manifest")]
    ComponentNotFound(String),
    #[error("{field:?} in {scope} does not hold a plain value")]
    UnexpectedType { scope: Scope, field: String },
}

impl ManifestError {
    /// Whether the error means the requested field or component doesn't
    /// exist, as opposed to the manifest itself being unusable.
    pub fn is_missing_target(&self) -> bool {
        matches!(
            self,
            ManifestError::FieldNotFound { .. }
                | ManifestError::ComponentNotFound(_)
                | ManifestError::UnexpectedType { .. }
        )
    }
}

/// An error found when checking a freshly written parameters file.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Parameters file does not seem to have been created: {path:?}")]
    FileCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parameters file is empty: {path:?}")]
    EmptyOutput { path: PathBuf },
}
