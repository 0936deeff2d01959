// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use indexmap::IndexMap;

pub const DESCRIPTION: &str = "Description";
pub const FILES: &str = "Files";

#[derive(Clone, Debug, PartialEq, Eq)]
struct FormField {
    lines: Vec<String>,
    /// Written as an indented block under the field name rather than on the
    /// same line.
    block: bool,
}

/// A change specification as printed by `p4 change -o` and read by
/// `p4 submit -i`.
///
/// ```text
/// Change:	new
///
/// Description:
/// 	Some text.
///
/// Files:
/// 	//depot/a.json	# edit
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeForm {
    fields: IndexMap<String, FormField>,
}

impl ChangeForm {
    /// Parses a form. Comment lines are dropped.
    pub fn parse(text: &str) -> Self {
        let mut form = ChangeForm::default();
        let mut current: Option<String> = None;
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            if let Some(value) = line.strip_prefix('\t') {
                if let Some(field) = current.as_ref().and_then(|name| form.fields.get_mut(name)) {
                    field.lines.push(value.to_owned());
                }
                continue;
            }
            if line.trim().is_empty() {
                current = None;
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let field = if value.is_empty() {
                FormField {
                    lines: Vec::new(),
                    block: true,
                }
            } else {
                FormField {
                    lines: vec![value.to_owned()],
                    block: false,
                }
            };
            form.fields.insert(name.to_owned(), field);
            current = Some(name.to_owned());
        }
        form
    }

    /// Returns the value of a single-line field, or the lines of a block
    /// field joined with newlines.
    pub fn get(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|field| field.lines.join("\n"))
    }

    /// Sets a block field, keeping its position if it already exists.
    pub fn set_block<I, S>(&mut self, name: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.insert(
            name.to_owned(),
            FormField {
                lines: lines.into_iter().map(Into::into).collect(),
                block: true,
            },
        );
    }

    pub fn set_description(&mut self, message: &str) {
        self.set_block(DESCRIPTION, message.lines());
    }

    pub fn set_files(&mut self, files: &[&str]) {
        self.set_block(FILES, files.iter().copied());
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, field) in self.fields.iter() {
            if field.block {
                out.push_str(&format!("{name}:\n"));
                for line in field.lines.iter() {
                    out.push_str(&format!("\t{line}\n"));
                }
            } else {
                out.push_str(&format!("{name}:\t{}\n", field.lines.join(" ")));
            }
            out.push('\n');
        }
        out
    }
}
