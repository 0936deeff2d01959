// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Updates a product manifest after a build, so that at any moment the
//! manifest describes exactly what the product is made of, and optionally
//! submits the result to Perforce.
//!
//! Typical invocations:
//!
//! ```sh
//! update_manifest --manifest_file ${manifest} --product --version ${version}
//! update_manifest --manifest_file ${manifest} --product --version ${version} \
//!     --changelist ${changelist} --timestamp
//! update_manifest --manifest_file ${manifest} --component ${component} \
//!     --version ${version} --changelist ${changelist} \
//!     --p4_location ${p4_location} --submit
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use cliutil::cli_main;
use manifest::{
    set_component_field, set_product_field, CHANGELIST, P4_LOCATION, TIMESTAMP, VERSION,
};
use perforce::{
    manifest_depot_path, product_from_manifest_name, submit_file, ChangeSubject, P4Args, P4Cli,
    P4Error, P4Settings,
};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

#[derive(Parser, Debug)]
#[command(author, about = "Updates a product manifest and optionally submits it.", long_about = None)]
struct Cli {
    /// The manifest file to update. This is how you point to either the
    /// master manifest or a release manifest file.
    #[arg(short = 'm', long = "manifest_file")]
    manifest_file: PathBuf,

    /// Update the product-level fields.
    #[arg(short = 'p', long = "product")]
    product: bool,

    /// The component to update.
    #[arg(short = 's', long = "component")]
    component: Option<String>,

    /// The new version.
    #[arg(short = 'v', long = "version")]
    version: Option<String>,

    /// The new changelist.
    #[arg(short = 'c', long = "changelist")]
    changelist: Option<String>,

    /// The P4 location to use to build the component. Also the depot
    /// directory the manifest is submitted to.
    #[arg(short = 'b', long = "p4_location")]
    p4_location: Option<String>,

    /// Set the product timestamp to the current time.
    #[arg(short = 't', long = "timestamp")]
    timestamp: bool,

    /// Submit the updated manifest to Perforce.
    #[arg(short = 'u', long = "submit")]
    submit: bool,

    #[command(flatten)]
    p4: P4Args,
}

impl Cli {
    fn component(&self) -> Option<&str> {
        self.component.as_deref().filter(|c| !c.is_empty())
    }
}

/// The current time as unix epoch seconds.
fn compute_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

fn check_prerequisites(manifest_file: &Path) -> Result<()> {
    if !manifest_file.is_file() {
        bail!("manifest file not found: {}", manifest_file.display());
    }
    Ok(())
}

/// Applies the requested updates in a fixed order and returns the path of the
/// last file written, if any update was requested.
fn apply_updates(args: &Cli) -> Result<Option<PathBuf>> {
    let manifest_file = args.manifest_file.as_path();
    let mut file_to_submit = None;

    if args.product {
        if let Some(version) = &args.version {
            file_to_submit = Some(set_product_field(manifest_file, VERSION, version)?);
        }
        if let Some(changelist) = &args.changelist {
            file_to_submit = Some(set_product_field(manifest_file, CHANGELIST, changelist)?);
        }
        if args.timestamp {
            let timestamp = compute_timestamp();
            file_to_submit = Some(set_product_field(manifest_file, TIMESTAMP, &timestamp)?);
        }
    }

    if let Some(component) = args.component() {
        if let Some(version) = &args.version {
            file_to_submit = Some(set_component_field(
                manifest_file,
                component,
                VERSION,
                version,
            )?);
        }
        if let Some(changelist) = &args.changelist {
            file_to_submit = Some(set_component_field(
                manifest_file,
                component,
                CHANGELIST,
                changelist,
            )?);
        }
        if let Some(p4_location) = &args.p4_location {
            file_to_submit = Some(set_component_field(
                manifest_file,
                component,
                P4_LOCATION,
                p4_location,
            )?);
        }
    }

    Ok(file_to_submit)
}

/// Everything needed to submit, checked before the manifest is touched.
struct Submission {
    settings: P4Settings,
    p4_location: String,
}

impl Submission {
    fn prepare(args: &Cli) -> Result<Self, P4Error> {
        let p4_location = args
            .p4_location
            .clone()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| {
                P4Error::Config(
                    "--submit requires --p4_location, the depot directory of the manifest".into(),
                )
            })?;
        Ok(Self {
            settings: args.p4.to_settings()?,
            p4_location,
        })
    }

    fn submit(self, manifest_file: &Path, args: &Cli) -> Result<u32> {
        let depot_path = manifest_depot_path(&self.p4_location, manifest_file)?;
        let product = product_from_manifest_name(manifest_file)?;
        let subject = match args.component() {
            Some(component) => ChangeSubject::Component {
                component,
                version: args.version.as_deref(),
                changelist: args.changelist.as_deref(),
                p4_location: args.p4_location.as_deref(),
            },
            None => ChangeSubject::Product {
                product,
                version: args.version.as_deref(),
            },
        };
        log::info!("Submitting {} of product {}", depot_path, product);

        let password = self.settings.password.clone();
        let change = submit_file(
            P4Cli::new(self.settings),
            &password,
            &depot_path,
            &subject.description(),
        )
        .with_context(|| format!("Failed to submit {depot_path}"))?;
        Ok(change)
    }
}

fn do_main() -> Result<()> {
    let args = Cli::parse();

    check_prerequisites(&args.manifest_file)?;

    let submission = if args.submit {
        Some(Submission::prepare(&args)?)
    } else {
        None
    };

    let file_to_submit = apply_updates(&args)?;

    if let Some(submission) = submission {
        match file_to_submit {
            Some(file) => {
                let change = submission.submit(&file, &args)?;
                log::info!("Submitted {} in change {}", file.display(), change);
            }
            None => log::warn!("No field was selected for update; nothing to submit"),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    cli_main(do_main, Default::default())
}
