// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::SessionState;

/// An error from any stage of a Perforce submission. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum P4Error {
    #[error("Perforce is not configured: {0}")]
    Config(String),
    #[error("failed to connect to the Perforce server: {0}")]
    Connection(String),
    #[error("failed to log in to the Perforce server: {0}")]
    Auth(String),
    #[error("failed to open {path} for edit: {message}")]
    Checkout { path: String, message: String },
    #[error("failed to submit the change: {0}")]
    Submit(String),
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
