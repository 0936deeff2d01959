// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Reads and updates product manifests.
//!
//! A manifest is a JSON document describing a product (`name`, `description`,
//! `version`, `changelist`, `timestamp`) and its `components`, each with its
//! own `version`, `changelist` and `p4_location`. Key order is significant and
//! is preserved across rewrites.

mod error;
mod format;
mod manifest;
mod mutate;
mod params;

pub use crate::error::*;
pub use crate::manifest::*;
pub use crate::mutate::*;
pub use crate::params::*;
