// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::process::Command;

use crate::{P4Error, P4Settings, ScriptOutput};

/// Runs `p4` commands against one server and workspace.
pub trait P4Runner {
    /// Runs `p4 <args>`, writing `input` to its stdin.
    fn run(&mut self, args: &[&str], input: Option<&str>) -> Result<ScriptOutput, P4Error>;

    /// Releases whatever the runner holds on to. Called once per session.
    fn disconnect(&mut self) -> Result<(), P4Error> {
        Ok(())
    }
}

/// A [`P4Runner`] that spawns the `p4` command line client.
pub struct P4Cli {
    settings: P4Settings,
}

impl P4Cli {
    pub fn new(settings: P4Settings) -> Self {
        Self { settings }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.arg("-s")
            .args(["-p", &self.settings.port])
            .args(["-u", &self.settings.user])
            .args(["-c", &self.settings.client])
            .args(["-C", &self.settings.charset])
            .args(args);
        cmd
    }
}

impl P4Runner for P4Cli {
    fn run(&mut self, args: &[&str], input: Option<&str>) -> Result<ScriptOutput, P4Error> {
        let mut cmd = self.command(args);
        tracing::debug!("Running p4 {}", args.join(" "));
        let output = processes::run_with_input(&mut cmd, input.map(str::as_bytes))?;
        let output = ScriptOutput::parse(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            output.status.code(),
        );
        for message in output.messages.iter() {
            tracing::debug!("p4 {:?}: {}", message.level, message.text);
        }
        Ok(output)
    }

    fn disconnect(&mut self) -> Result<(), P4Error> {
        tracing::debug!(
            "Done with {} as {} on {}",
            self.settings.client,
            self.settings.user,
            self.settings.port
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Level;
    use anyhow::Result;
    use std::{os::unix::fs::PermissionsExt, path::Path};

    fn settings(program: &Path) -> P4Settings {
        P4Settings {
            port: "ssl:perforce:1666".into(),
            user: "builder".into(),
            password: "secret".into(),
            client: "builder-ws".into(),
            charset: "utf8".into(),
            program: program.to_owned(),
        }
    }

    #[test]
    fn passes_connection_options() {
        let cli = P4Cli::new(settings(Path::new("p4")));
        let cmd = cli.command(&["edit", "//depot/a.json"]);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
        assert_eq!(
            args,
            vec![
                "-s",
                "-p",
                "ssl:perforce:1666",
                "-u",
                "builder",
                "-c",
                "builder-ws",
                "-C",
                "utf8",
                "edit",
                "//depot/a.json"
            ]
        );
    }

    #[test]
    fn runs_program_and_parses_output() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let program = dir.path().join("p4");
        std::fs::write(
            &program,
            "#!/bin/sh\n\
            read -r line\n\
            echo \"info: args $*\"\n\
            echo \"info: stdin $line\"\n\
            echo \"exit: 0\"\n",
        )?;
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;

        let mut cli = P4Cli::new(settings(&program));
        let output = cli.run(&["login"], Some("secret\n"))?;

        assert!(output.succeeded());
        assert_eq!(output.messages.len(), 2);
        assert_eq!(output.messages[0].level, Level::Info);
        assert!(
            output.messages[0].text.ends_with("-C utf8 login"),
            "{:?}",
            output
        );
        assert_eq!(output.messages[1].text, "stdin secret");
        Ok(())
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut cli = P4Cli::new(settings(Path::new("/nonexistent/p4")));
        assert!(matches!(
            cli.run(&["opened"], None),
            Err(P4Error::Other(_))
        ));
    }
}
