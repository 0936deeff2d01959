// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::{
    fs::OpenOptions,
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};

use crate::{Manifest, ManifestError, Node, Scope};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ManifestError + '_ {
    move |source| ManifestError::Io {
        path: path.to_owned(),
        source,
    }
}

/// Replaces the value of `field` in `scope` of the manifest at `path`,
/// rewriting the whole file in place.
///
/// A missing component or field is logged and leaves the file untouched; it
/// is not an error, so callers chaining several updates get every update that
/// can be applied. Only I/O and parse failures are returned.
///
/// Returns the path that was written, which is always `path`.
pub fn set_field(
    path: &Path,
    scope: &Scope,
    field: &str,
    value: &str,
) -> Result<PathBuf, ManifestError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(io_error(path))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(io_error(path))?;
    let mut manifest = Manifest::parse(&content, &format!("{}", path.display()))?;

    if let Scope::Component(name) = scope {
        tracing::info!("Selected component to modify is {}", name);
        tracing::info!("    - {} to update to is {}", field, value);
    }

    let previous = match manifest.field_mut(scope, field) {
        Ok(slot) => slot.replace(value),
        Err(err) if err.is_missing_target() => {
            tracing::error!("Not updating {} in {}: {}", field, path.display(), err);
            return Ok(path.to_owned());
        }
        Err(err) => return Err(err),
    };
    match (&previous, scope) {
        (Node::Text(old), Scope::Component(name)) => {
            tracing::info!("Current {} for {} is {}", field, name, old)
        }
        (Node::Text(old), Scope::Product) => {
            tracing::info!("Current {} for product is {}", field, old)
        }
        (other, _) => tracing::info!("Current {} in {} is {:?}", field, scope, other),
    }

    let new_content = manifest.to_json()?;
    file.rewind().map_err(io_error(path))?;
    file.write_all(new_content.as_bytes())
        .map_err(io_error(path))?;
    file.set_len(new_content.len() as u64)
        .map_err(io_error(path))?;
    tracing::info!("Updated {} for {} to {}", field, scope, value);

    Ok(path.to_owned())
}

/// Replaces a top-level field of the manifest at `path`. See [`set_field`].
pub fn set_product_field(path: &Path, field: &str, value: &str) -> Result<PathBuf, ManifestError> {
    set_field(path, &Scope::Product, field, value)
}

/// Replaces a field of `component` in the manifest at `path`. See
/// [`set_field`].
pub fn set_component_field(
    path: &Path,
    component: &str,
    field: &str,
    value: &str,
) -> Result<PathBuf, ManifestError> {
    set_field(path, &Scope::Component(component.to_owned()), field, value)
}
