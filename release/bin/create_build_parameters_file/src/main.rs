// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::{Context, Result};
use clap::Parser;
use cliutil::cli_main;
use manifest::{verify_parameters_file, write_parameters_file};
use std::{path::PathBuf, process::ExitCode};

/// Creates the parameters file a component build reads its name, version and
/// source location from.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The manifest file to read. This is how you point to either the master
    /// manifest or a release manifest file.
    #[arg(short = 'm', long = "manifest_file")]
    manifest_file: PathBuf,

    /// The component for which to make the build parameters file.
    #[arg(short = 's', long = "component")]
    component: String,

    /// The parameters file to create for the build process.
    #[arg(short = 'o', long = "outfile")]
    outfile: PathBuf,
}

fn do_main() -> Result<ExitCode> {
    let args = Cli::parse();

    write_parameters_file(&args.manifest_file, &args.component, &args.outfile).with_context(
        || {
            format!(
                "Failed to create the build parameters file for {} from {}",
                args.component,
                args.manifest_file.display()
            )
        },
    )?;

    match verify_parameters_file(&args.outfile) {
        Ok(size) => {
            log::info!("{} has {} bytes", args.outfile.display(), size);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", err);
            Ok(ExitCode::from(1))
        }
    }
}

fn main() -> ExitCode {
    cli_main(do_main, Default::default())
}
