// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;

use crate::{ChangeForm, Level, P4Error, P4Runner, ScriptOutput};

lazy_static! {
    // "Change 123 submitted." or "Change 123 renamed change 125 and submitted."
    static ref SUBMITTED_RE: Regex =
        Regex::new(r"Change (\d+) (?:renamed change (\d+) and )?submitted").unwrap();
}

/// Markers p4 prints when it can't reach the server at all, as opposed to
/// rejecting the credentials.
const CONNECTION_FAILURES: &[&str] = &[
    "Connect to server failed",
    "TCP connect to",
    "check $P4PORT",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Editing,
    Pending,
    Submitted,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Editing => "editing",
            SessionState::Pending => "pending",
            SessionState::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// A logged-in Perforce session that checks out, describes and submits one
/// change.
///
/// The session moves through `connected -> editing -> pending -> submitted`
/// and is disconnected when dropped, whichever state it ended up in.
pub struct Session<R: P4Runner> {
    runner: R,
    state: SessionState,
    opened: Vec<String>,
    change: Option<ChangeForm>,
}

impl<R: P4Runner> Session<R> {
    /// Logs in with `password` and lists the files already opened in the
    /// workspace.
    pub fn connect(mut runner: R, password: &str) -> Result<Self, P4Error> {
        let login = match runner.run(&["login"], Some(&format!("{password}\n"))) {
            Ok(output) => output,
            Err(err) => {
                let _ = runner.disconnect();
                return Err(match err {
                    P4Error::Other(err) => P4Error::Connection(format!("{err:#}")),
                    err => err,
                });
            }
        };
        if !login.succeeded() {
            let problems = login.problems();
            let _ = runner.disconnect();
            if CONNECTION_FAILURES.iter().any(|m| login.mentions(m)) {
                return Err(P4Error::Connection(problems));
            }
            return Err(P4Error::Auth(problems));
        }
        tracing::info!("Logged in to Perforce: {}", login.info_text());

        let mut session = Session {
            runner,
            state: SessionState::Connected,
            opened: Vec::new(),
            change: None,
        };
        let opened = session.runner.run(&["opened"], None)?;
        for message in opened.messages.iter() {
            tracing::info!("Opened before this change: {}", message.text);
        }
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> Result<(), P4Error> {
        if self.state != expected {
            return Err(P4Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Opens `depot_path` for edit in the default change.
    pub fn begin_edit(&mut self, depot_path: &str) -> Result<(), P4Error> {
        self.expect_state(SessionState::Connected, "open a file for edit")?;
        let output = self.runner.run(&["edit", depot_path], None)?;
        let opened = output
            .messages
            .iter()
            .any(|m| m.level == Level::Info && m.text.contains("opened for edit"));
        if !opened || output.has(Level::Error) {
            return Err(P4Error::Checkout {
                path: depot_path.to_owned(),
                message: output.problems(),
            });
        }
        tracing::info!("Opened {} for edit", depot_path);
        self.opened.push(depot_path.to_owned());
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Fetches the pending change form and fills in its description and
    /// file list.
    pub fn stage_description(&mut self, message: &str, files: &[&str]) -> Result<(), P4Error> {
        self.expect_state(SessionState::Editing, "describe the change")?;
        let output = self.runner.run(&["change", "-o"], None)?;
        if !output.succeeded() {
            return Err(P4Error::Submit(format!(
                "failed to fetch the change form: {}",
                output.problems()
            )));
        }
        let mut form = ChangeForm::parse(&output.info_text());
        form.set_description(message);
        form.set_files(files);
        tracing::info!("Change description: {}", message);
        self.change = Some(form);
        self.state = SessionState::Pending;
        Ok(())
    }

    /// Submits the pending change and returns its number.
    pub fn submit(&mut self) -> Result<u32, P4Error> {
        self.expect_state(SessionState::Pending, "submit")?;
        let form = self
            .change
            .as_ref()
            .map(ChangeForm::render)
            .unwrap_or_default();
        let output = self.runner.run(&["submit", "-i"], Some(&form))?;
        let change = submitted_change(&output)
            .filter(|_| output.succeeded())
            .ok_or_else(|| P4Error::Submit(output.problems()))?;
        tracing::info!("Submitted change {}", change);
        self.change = None;
        self.state = SessionState::Submitted;
        Ok(change)
    }

    /// Disconnects from the server. Dropping the session does the same.
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        if self.state != SessionState::Submitted && !self.opened.is_empty() {
            tracing::warn!(
                "Disconnecting while {}; still opened: {}",
                self.state,
                self.opened.join(", ")
            );
        }
        if let Err(err) = self.runner.disconnect() {
            tracing::warn!("Failed to disconnect from Perforce: {:#}", err);
        }
        self.state = SessionState::Disconnected;
    }
}

impl<R: P4Runner> Drop for Session<R> {
    fn drop(&mut self) {
        self.release();
    }
}

fn submitted_change(output: &ScriptOutput) -> Option<u32> {
    output.messages.iter().find_map(|m| {
        let caps = SUBMITTED_RE.captures(&m.text)?;
        caps.get(2).or_else(|| caps.get(1))?.as_str().parse().ok()
    })
}
