// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::Path;

use crate::{P4Error, P4Runner, Session};

/// What a manifest update changed, for the change description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeSubject<'a> {
    Product {
        product: &'a str,
        version: Option<&'a str>,
    },
    Component {
        component: &'a str,
        version: Option<&'a str>,
        changelist: Option<&'a str>,
        p4_location: Option<&'a str>,
    },
}

impl ChangeSubject<'_> {
    pub fn description(&self) -> String {
        let show = |value: Option<&str>| value.unwrap_or("none").to_owned();
        match self {
            ChangeSubject::Product { product, version } => format!(
                "Auto updating the manifest for {} (version: {}).",
                product,
                show(*version)
            ),
            ChangeSubject::Component {
                component,
                version,
                changelist,
                p4_location,
            } => format!(
                "Auto updating the manifest for {} (version: {}, changelist: {}, p4_location: {}).",
                component,
                show(*version),
                show(*changelist),
                show(*p4_location)
            ),
        }
    }
}

fn file_name(manifest_path: &Path) -> Result<&str, P4Error> {
    manifest_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            P4Error::Config(format!(
                "manifest path {} has no usable file name",
                manifest_path.display()
            ))
        })
}

/// Extracts the product name from a manifest file name such as
/// `product-manifest.json`: everything before the first `-`, or the file
/// stem if there is no `-`.
pub fn product_from_manifest_name(manifest_path: &Path) -> Result<&str, P4Error> {
    let name = file_name(manifest_path)?;
    Ok(match name.split_once('-') {
        Some((product, _)) => product,
        None => name.rsplit_once('.').map_or(name, |(stem, _)| stem),
    })
}

/// The depot path the manifest is checked in at: `<p4_location>/<file name>`.
pub fn manifest_depot_path(p4_location: &str, manifest_path: &Path) -> Result<String, P4Error> {
    let name = file_name(manifest_path)?;
    Ok(format!("{}/{}", p4_location.trim_end_matches('/'), name))
}

/// Checks `depot_path` out, describes it with `message` and submits it.
/// Returns the submitted change number.
///
/// The session is disconnected whether or not any step fails.
pub fn submit_file<R: P4Runner>(
    runner: R,
    password: &str,
    depot_path: &str,
    message: &str,
) -> Result<u32, P4Error> {
    let mut session = Session::connect(runner, password)?;
    session.begin_edit(depot_path)?;
    session.stage_description(message, &[depot_path])?;
    let change = session.submit()?;
    session.disconnect();
    Ok(change)
}
