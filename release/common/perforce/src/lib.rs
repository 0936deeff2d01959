// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Checks files into a Perforce depot by driving the `p4` command line
//! client.

mod error;
mod form;
mod publish;
mod runner;
mod script;
mod session;
mod settings;

#[cfg(test)]
pub(crate) mod fake;

pub use crate::error::*;
pub use crate::form::*;
pub use crate::publish::*;
pub use crate::runner::*;
pub use crate::script::*;
pub use crate::session::*;
pub use crate::settings::*;
