//! Fixtures shared by the binary-level tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::{fs, path::Path};
use tempfile::TempDir;

pub const FRESH_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJmYWN0IiwiZXhwIjo0MTAyNDQ0ODAwfQ.sig";

/// A `fact` invocation reading its configuration from `dir` only.
pub fn fact(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fact").unwrap();
    cmd.env("FACT_CONFIG_DIR", dir).env_remove("RUST_LOG");
    cmd
}

pub fn write_config(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("config.yml"), contents).unwrap();
}

pub fn write_token(dir: &TempDir, token: &str) {
    fs::write(
        dir.path().join("credentials.yml"),
        format!("jwt: {}\n", token),
    )
    .unwrap();
}

/// An inventory tool that knows `node01` as `abc-123` and nothing else.
#[cfg(unix)]
pub fn write_inventory_tool(dir: &TempDir) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("inventory");
    fs::write(
        &path,
        "#!/bin/sh\n\
         if [ \"$2\" = node01 ]; then\n\
           printf '1\\tnode01\\track\\tdc\\tok\\tabc-123\\n'\n\
           exit 0\n\
         fi\n\
         exit 21\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}
