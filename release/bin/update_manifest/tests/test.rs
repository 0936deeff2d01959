// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output},
};
use tempfile::TempDir;

const MANIFEST_NAME: &str = "product-manifest.json";

const MANIFEST: &str = r#"{
    "name":"product",
    "description":"Everything the product is made of",
    "version":"1.0.0",
    "changelist":"1000",
    "timestamp":"1500000000",
    "components":{
        "svc":{
            "version":"1.2.3",
            "changelist":"998",
            "p4_location":"//depot/svc/main"
        },
        "ui":{
            "version":"2.0.0",
            "changelist":"999",
            "p4_location":"//depot/ui/main",
            "build_number":42
        }
    }
}"#;

const EDIT_OK: &str = r#"echo "info: $2#3 - opened for edit""#;
const EDIT_NOT_IN_VIEW: &str = r#"echo "error: $2 - file(s) not in client view."; echo "exit: 1"; exit 1"#;

fn run_tool(dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_update_manifest"))
        .args(args)
        .current_dir(dir)
        .env("RELEASE_TOOLS_LOG_CONSOLE", "0")
        .env_remove("RELEASE_TOOLS_LOG_FILE")
        .env_remove("RELEASE_TOOLS_LOG_DIR")
        .env_remove("RUST_LOG")
        .env_remove("P4PORT")
        .env_remove("P4USER")
        .env_remove("P4PASSWD")
        .env_remove("P4CLIENT")
        .output()?;
    Ok(output)
}

fn setup() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join(MANIFEST_NAME), MANIFEST)?;
    Ok(dir)
}

fn read_manifest(dir: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(dir.join(MANIFEST_NAME))?;
    Ok(serde_json::from_str(&content)?)
}

/// Installs a `p4` stand-in that records its commands in `p4.calls` and the
/// submitted change form in `p4.submitted`.
fn install_fake_p4(dir: &Path, edit: &str) -> Result<PathBuf> {
    let program = dir.join("p4");
    let script = format!(
        r#"#!/bin/sh
here=$(dirname "$0")
# Drop -s -p <port> -u <user> -c <client> -C <charset>.
shift 9
echo "$*" >> "$here/p4.calls"
case "$1" in
login)
    cat > /dev/null
    echo "info: User builder logged in."
    ;;
opened)
    ;;
edit)
    {edit}
    ;;
change)
    printf 'info: Change:\tnew\ninfo: \ninfo: Client:\tbuilder-ws\ninfo: \ninfo: Description:\ninfo: \t<enter description here>\n'
    ;;
submit)
    cat > "$here/p4.submitted"
    echo "info: Change 77 submitted."
    ;;
*)
    echo "error: unexpected command $*"
    echo "exit: 1"
    exit 1
    ;;
esac
echo "exit: 0"
"#
    );
    std::fs::write(&program, script)?;
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;
    Ok(program)
}

fn p4_flags(program: &Path) -> Vec<String> {
    vec![
        "--p4_port".into(),
        "perforce:1666".into(),
        "--p4_user".into(),
        "builder".into(),
        "--p4_password".into(),
        "secret".into(),
        "--p4_client".into(),
        "builder-ws".into(),
        "--p4_program".into(),
        program.to_string_lossy().into_owned(),
    ]
}

#[test]
fn updates_product_fields() -> Result<()> {
    let dir = setup()?;

    let before = chrono::Utc::now().timestamp();
    let output = run_tool(
        dir.path(),
        &[
            "--manifest_file",
            MANIFEST_NAME,
            "--product",
            "--version",
            "1.1.0",
            "--changelist",
            "2000",
            "--timestamp",
        ],
    )?;
    let after = chrono::Utc::now().timestamp();

    assert!(output.status.success(), "{output:?}");
    let manifest = read_manifest(dir.path())?;
    assert_eq!(manifest["version"], "1.1.0");
    assert_eq!(manifest["changelist"], "2000");
    let timestamp: i64 = manifest["timestamp"]
        .as_str()
        .unwrap_or_default()
        .parse()?;
    assert!(before <= timestamp && timestamp <= after, "{timestamp}");

    // Components are untouched and keys keep their order.
    assert_eq!(manifest["components"]["svc"]["version"], "1.2.3");
    let keys: Vec<_> = manifest
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    assert_eq!(
        keys,
        vec![
            "name",
            "description",
            "version",
            "changelist",
            "timestamp",
            "components"
        ]
    );
    Ok(())
}

#[test]
fn updates_component_fields_only() -> Result<()> {
    let dir = setup()?;

    let output = run_tool(
        dir.path(),
        &[
            "-m",
            MANIFEST_NAME,
            "-s",
            "svc",
            "-v",
            "1.2.4",
            "-c",
            "2001",
            "-b",
            "//depot/svc/rel",
        ],
    )?;

    assert!(output.status.success(), "{output:?}");
    let expected = MANIFEST
        .replace(r#""version":"1.2.3""#, r#""version":"1.2.4""#)
        .replace(r#""changelist":"998""#, r#""changelist":"2001""#)
        .replace("//depot/svc/main", "//depot/svc/rel");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(MANIFEST_NAME))?,
        expected
    );
    Ok(())
}

#[test]
fn missing_component_leaves_manifest_alone() -> Result<()> {
    let dir = setup()?;

    let output = run_tool(
        dir.path(),
        &["--manifest_file", MANIFEST_NAME, "--component", "db", "--version", "9"],
    )?;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(MANIFEST_NAME))?,
        MANIFEST
    );
    let log = std::fs::read_to_string(dir.path().join("update_manifest.log"))?;
    assert!(log.contains("ERROR"), "{log}");
    Ok(())
}

#[test]
fn missing_manifest_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let output = run_tool(
        dir.path(),
        &["--manifest_file", MANIFEST_NAME, "--product", "--version", "1"],
    )?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("manifest file not found"), "{stderr}");
    assert!(!dir.path().join(MANIFEST_NAME).exists());
    Ok(())
}

#[test]
fn submit_without_perforce_settings_fails_before_updating() -> Result<()> {
    let dir = setup()?;

    let output = run_tool(
        dir.path(),
        &[
            "--manifest_file",
            MANIFEST_NAME,
            "--product",
            "--version",
            "1.1.0",
            "--p4_location",
            "//depot/product",
            "--submit",
        ],
    )?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Perforce is not configured"), "{stderr}");
    assert!(stderr.contains("--p4_port/P4PORT"), "{stderr}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(MANIFEST_NAME))?,
        MANIFEST
    );
    Ok(())
}

#[test]
fn submits_updated_manifest() -> Result<()> {
    let dir = setup()?;
    let program = install_fake_p4(dir.path(), EDIT_OK)?;

    let mut args: Vec<String> = [
        "--manifest_file",
        MANIFEST_NAME,
        "--component",
        "svc",
        "--version",
        "1.2.4",
        "--changelist",
        "2001",
        "--p4_location",
        "//depot/product",
        "--submit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend(p4_flags(&program));
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = run_tool(dir.path(), &args)?;

    assert!(output.status.success(), "{output:?}");
    let calls = std::fs::read_to_string(dir.path().join("p4.calls"))?;
    assert_eq!(
        calls,
        "login\n\
         opened\n\
         edit //depot/product/product-manifest.json\n\
         change -o\n\
         submit -i\n"
    );
    let submitted = std::fs::read_to_string(dir.path().join("p4.submitted"))?;
    assert!(
        submitted.contains(
            "\tAuto updating the manifest for svc \
             (version: 1.2.4, changelist: 2001, p4_location: //depot/product)."
        ),
        "{submitted}"
    );
    assert!(
        submitted.contains("Files:\n\t//depot/product/product-manifest.json"),
        "{submitted}"
    );
    assert!(!submitted.contains("<enter description here>"), "{submitted}");

    let log = std::fs::read_to_string(dir.path().join("update_manifest.log"))?;
    assert!(log.contains("Submitted change 77"), "{log}");
    Ok(())
}

#[test]
fn failed_checkout_is_fatal() -> Result<()> {
    let dir = setup()?;
    let program = install_fake_p4(dir.path(), EDIT_NOT_IN_VIEW)?;

    let mut args: Vec<String> = [
        "--manifest_file",
        MANIFEST_NAME,
        "--product",
        "--version",
        "1.1.0",
        "--p4_location",
        "//depot/product",
        "--submit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend(p4_flags(&program));
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = run_tool(dir.path(), &args)?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("not in client view"), "{stderr}");
    let calls = std::fs::read_to_string(dir.path().join("p4.calls"))?;
    assert!(!calls.contains("submit"), "{calls}");
    Ok(())
}
