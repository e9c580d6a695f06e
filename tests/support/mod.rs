#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn bundled_catalog_dir() -> PathBuf {
    repo_root().join("catalogs")
}

pub fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_param-catalog"));
    // Keep ambient configuration from leaking into assertions.
    cmd.env_remove("PARAM_CATALOG_PATH")
        .env_remove("PARAM_CATALOG_ROOT")
        .env_remove("PARAM_CATALOG_ALLOWED_SCHEMAS")
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_command(cmd: Command) -> Result<Output> {
    let mut cmd = cmd;
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Directory of package declarations that disappears with the test.
pub struct PackageDir {
    dir: TempDir,
}

impl PackageDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("allocating package dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file_name: &str, document: &Value) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(document)?)
            .with_context(|| format!("writing fixture {}", path.display()))?;
        Ok(path)
    }
}

pub fn package(namespace: &str, parameters: Value) -> Value {
    json!({
        "schema_version": "parameter_package_v1",
        "package": namespace,
        "parameters": parameters
    })
}

pub fn string_param(name: &str, allowed: &[&str], default: Option<&str>) -> Value {
    let mut param = json!({
        "name": name,
        "label": name,
        "category": "Fixtures",
        "type": "string",
        "allowed_values": allowed,
    });
    if let Some(default) = default {
        param["default"] = json!(default);
    }
    param
}
