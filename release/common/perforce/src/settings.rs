// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use clap::Args;
use std::{fmt::Debug, path::PathBuf};

use crate::P4Error;

/// Command line arguments selecting the Perforce server and workspace.
/// Each one falls back to the environment variable the `p4` client itself
/// reads.
#[derive(Args, Clone, Debug)]
pub struct P4Args {
    /// The Perforce server address (host:port).
    #[arg(long = "p4_port", env = "P4PORT")]
    pub port: Option<String>,

    /// The Perforce user to log in as.
    #[arg(long = "p4_user", env = "P4USER")]
    pub user: Option<String>,

    /// The password of the Perforce user.
    #[arg(long = "p4_password", env = "P4PASSWD", hide_env_values = true)]
    pub password: Option<String>,

    /// The Perforce client workspace the manifest is mapped in.
    #[arg(long = "p4_client", env = "P4CLIENT")]
    pub client: Option<String>,

    #[arg(long = "p4_charset", default_value = "utf8")]
    pub charset: String,

    /// The `p4` executable to run.
    #[arg(long = "p4_program", default_value = "p4")]
    pub program: PathBuf,
}

/// Validated Perforce connection settings.
#[derive(Clone)]
pub struct P4Settings {
    pub port: String,
    pub user: String,
    pub password: String,
    pub client: String,
    pub charset: String,
    pub program: PathBuf,
}

impl Debug for P4Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("P4Settings")
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("client", &self.client)
            .field("charset", &self.charset)
            .field("program", &self.program)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl P4Args {
    /// Checks that every setting needed to talk to the server is present.
    pub fn to_settings(&self) -> Result<P4Settings, P4Error> {
        let required = [
            ("--p4_port/P4PORT", &self.port),
            ("--p4_user/P4USER", &self.user),
            ("--p4_password/P4PASSWD", &self.password),
            ("--p4_client/P4CLIENT", &self.client),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| non_empty(value).is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(P4Error::Config(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let get = |value: &Option<String>| non_empty(value).unwrap_or_default().to_owned();
        Ok(P4Settings {
            port: get(&self.port),
            user: get(&self.user),
            password: get(&self.password),
            client: get(&self.client),
            charset: self.charset.clone(),
            program: self.program.clone(),
        })
    }
}
