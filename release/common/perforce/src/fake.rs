// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A scripted [`P4Runner`] for tests.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{P4Error, P4Runner, ScriptOutput};

const CHANGE_FORM: &str = "\
# A Perforce Change Specification.

Change:\tnew

Client:\tbuilder-ws

User:\tbuilder

Status:\tnew

Description:
\t<enter description here>

exit: 0
";

#[derive(Default)]
struct FakeState {
    responses: HashMap<String, String>,
    unrunnable: HashSet<String>,
    calls: Vec<(String, Option<String>)>,
}

/// Answers `p4` commands with canned script-mode output and records every
/// call. Clones share their state, so a test can keep a handle after giving
/// one to a session.
#[derive(Clone, Default)]
pub(crate) struct FakeP4 {
    state: Rc<RefCell<FakeState>>,
}

impl FakeP4 {
    /// A server on which everything succeeds.
    pub fn happy() -> Self {
        Self::default()
    }

    /// Overrides the output of `command` (its arguments joined by spaces).
    pub fn respond(self, command: &str, output: &str) -> Self {
        self.state
            .borrow_mut()
            .responses
            .insert(command.to_owned(), output.to_owned());
        self
    }

    /// Makes `command` fail as if `p4` could not be started.
    pub fn unrunnable(self, command: &str) -> Self {
        self.state
            .borrow_mut()
            .unrunnable
            .insert(command.to_owned());
        self
    }

    /// The commands run so far, with `<disconnect>` marking disconnects.
    pub fn commands(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    /// The stdin given to the last run of `command`.
    pub fn input_of(&self, command: &str) -> Option<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find(|(c, _)| c == command)
            .and_then(|(_, input)| input.clone())
    }
}

fn default_response(args: &[&str]) -> String {
    match args {
        ["login"] => "info: User builder logged in.\nexit: 0\n".to_owned(),
        ["opened"] => "exit: 0\n".to_owned(),
        ["edit", path] => format!("info: {path}#3 - opened for edit\nexit: 0\n"),
        ["change", "-o"] => CHANGE_FORM.to_owned(),
        ["submit", "-i"] => "info: Change 1235 created with 1 open file(s).\n\
            info: Submitting change 1235.\n\
            info: Locking 1 files ...\n\
            info: Change 1235 submitted.\n\
            exit: 0\n"
            .to_owned(),
        _ => format!("error: unexpected command {}\nexit: 1\n", args.join(" ")),
    }
}

impl P4Runner for FakeP4 {
    fn run(&mut self, args: &[&str], input: Option<&str>) -> Result<ScriptOutput, P4Error> {
        let command = args.join(" ");
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push((command.clone(), input.map(str::to_owned)));
        if state.unrunnable.contains(&command) {
            return Err(anyhow::anyhow!("failed to spawn p4 for {command}").into());
        }
        let stdout = state
            .responses
            .get(&command)
            .cloned()
            .unwrap_or_else(|| default_response(args));
        Ok(ScriptOutput::parse(&stdout, "", None))
    }

    fn disconnect(&mut self) -> Result<(), P4Error> {
        self.state
            .borrow_mut()
            .calls
            .push(("<disconnect>".to_owned(), None));
        Ok(())
    }
}
