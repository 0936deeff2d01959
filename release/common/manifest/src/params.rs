// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::{Path, PathBuf};

use crate::{Manifest, ManifestError, OutputError};

/// The values handed to the build step for a single component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildParameters {
    pub project_name: String,
    pub version: String,
    pub p4_location: String,
}

impl BuildParameters {
    /// Resolves the parameters of `component` from `manifest`.
    pub fn from_manifest(manifest: &Manifest, component: &str) -> Result<Self, ManifestError> {
        let version = manifest.component_version(component)?.into_owned();
        let p4_location = manifest.component_location(component)?.into_owned();
        tracing::info!(
            "Component {} is at version {} in {}",
            component,
            version,
            p4_location
        );
        Ok(Self {
            project_name: component.to_owned(),
            version,
            p4_location,
        })
    }

    /// Renders the `key=value` lines. Values are written as-is, with no
    /// quoting or escaping.
    pub fn render(&self) -> String {
        format!(
            "project_name={}\nbuild_version_woq={}\np4_location={}\n",
            self.project_name, self.version, self.p4_location
        )
    }
}

/// Writes the parameters file of `component` to `out`, replacing whatever was
/// there.
pub fn write_parameters_file(
    manifest_path: &Path,
    component: &str,
    out: &Path,
) -> Result<BuildParameters, ManifestError> {
    let manifest = Manifest::load(manifest_path)?;
    let params = BuildParameters::from_manifest(&manifest, component)?;
    std::fs::write(out, params.render()).map_err(|source| ManifestError::Io {
        path: out.to_owned(),
        source,
    })?;
    tracing::info!("Wrote build parameters for {} to {}", component, out.display());
    Ok(params)
}

/// Checks that a parameters file exists and is not empty. Returns its size.
pub fn verify_parameters_file(path: &Path) -> Result<u64, OutputError> {
    let metadata = std::fs::metadata(path).map_err(|source| OutputError::FileCreation {
        path: PathBuf::from(path),
        source,
    })?;
    if metadata.len() == 0 {
        return Err(OutputError::EmptyOutput {
            path: PathBuf::from(path),
        });
    }
    Ok(metadata.len())
}
