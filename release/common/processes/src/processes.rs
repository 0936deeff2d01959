// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::{Context, Result};
use std::{
    io::{ErrorKind, Write},
    process::{Command, Output, Stdio},
};
use tracing::instrument;

/// Runs a child process to completion, feeding `input` to its stdin and
/// capturing its stdout and stderr.
///
/// stdin is always a pipe and is closed once `input` has been written, so a
/// child that prompts for more input sees EOF.
#[instrument(skip_all, fields(command = %cmd.get_program().to_string_lossy()))]
pub fn run_with_input(cmd: &mut Command, input: Option<&[u8]>) -> Result<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {cmd:?}"))?;

    {
        // Dropping the handle closes the pipe.
        let mut stdin = child
            .stdin
            .take()
            .context("Child process has no stdin pipe")?;
        if let Some(input) = input {
            // A child may exit without reading its input; its output still counts.
            match stdin.write_all(input) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("Child process closed stdin before reading it all");
                }
                result => result.context("Failed to write to child process stdin")?,
            }
        }
    }

    let output = child.wait_with_output()?;
    tracing::debug!(status = %output.status, "Command finished");
    Ok(output)
}
