// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use itertools::Itertools;

/// The severity tag `p4 -s` puts in front of every output line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Text,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// The output of a `p4 -s` command, split into tagged messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    pub messages: Vec<Message>,
    pub exit_code: Option<i32>,
}

enum Line<'a> {
    Message(Level, &'a str),
    Exit(Option<i32>),
    Untagged(&'a str),
}

fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn classify(line: &str) -> Line<'_> {
    // Info messages carry their nesting level: "info:", "info1:", "info2:"...
    if let Some(rest) = line.strip_prefix("info") {
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
        if let Some(text) = strip_tag(rest, "") {
            return Line::Message(Level::Info, text);
        }
    }
    for (tag, level) in [
        ("text", Level::Text),
        ("warning", Level::Warning),
        ("error", Level::Error),
    ] {
        if let Some(text) = strip_tag(line, tag) {
            return Line::Message(level, text);
        }
    }
    if let Some(code) = strip_tag(line, "exit") {
        return Line::Exit(code.trim().parse().ok());
    }
    Line::Untagged(line)
}

impl ScriptOutput {
    /// Parses the captured streams of a `p4 -s` run. Untagged lines continue
    /// the previous message; untagged stderr lines on their own are errors.
    /// `status` is the process exit code, used when there is no `exit:` line.
    pub fn parse(stdout: &str, stderr: &str, status: Option<i32>) -> Self {
        let mut output = ScriptOutput::default();
        let mut exit_code = None;
        for (stream, default_level) in [(stdout, Level::Text), (stderr, Level::Error)] {
            let mut continuing = false;
            for line in stream.lines() {
                match classify(line) {
                    Line::Message(level, text) => {
                        output.messages.push(Message {
                            level,
                            text: text.to_owned(),
                        });
                        continuing = true;
                    }
                    Line::Exit(code) => {
                        exit_code = code;
                        continuing = false;
                    }
                    Line::Untagged(text) => match output.messages.last_mut() {
                        Some(last) if continuing => {
                            last.text.push('\n');
                            last.text.push_str(text);
                        }
                        _ => {
                            if text.trim().is_empty() {
                                continue;
                            }
                            output.messages.push(Message {
                                level: default_level,
                                text: text.to_owned(),
                            });
                            continuing = true;
                        }
                    },
                }
            }
        }
        output.exit_code = exit_code.or(status);
        output
    }

    /// Whether the command exited cleanly without reporting errors.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.has(Level::Error)
    }

    pub fn has(&self, level: Level) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }

    /// The info and text messages, one per line.
    pub fn info_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| matches!(m.level, Level::Info | Level::Text))
            .map(|m| m.text.as_str())
            .join("\n")
    }

    /// The warnings and errors, for use in error messages. Falls back to
    /// everything that was printed if there were none.
    pub fn problems(&self) -> String {
        let problems = self
            .messages
            .iter()
            .filter(|m| matches!(m.level, Level::Warning | Level::Error))
            .map(|m| m.text.trim())
            .join("; ");
        if !problems.is_empty() {
            return problems;
        }
        let everything = self.messages.iter().map(|m| m.text.trim()).join("; ");
        if everything.is_empty() {
            format!("p4 exited with {:?} and printed nothing", self.exit_code)
        } else {
            everything
        }
    }

    /// Whether any message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }
}
