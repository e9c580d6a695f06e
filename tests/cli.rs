// End-to-end coverage for the param-catalog binary.
mod support;

use anyhow::Result;
use serde_json::{Value, json};

use support::{PackageDir, bundled_catalog_dir, cli, package, run_command, string_param};

#[test]
fn check_reports_namespaces() -> Result<()> {
    let mut cmd = cli();
    cmd.arg("--catalog").arg(bundled_catalog_dir()).arg("check");
    let output = run_command(cmd)?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("common/parameters\t2 parameter(s)"), "{stdout}");
    Ok(())
}

#[test]
fn catalog_path_env_is_honoured() -> Result<()> {
    let mut cmd = cli();
    cmd.env("PARAM_CATALOG_PATH", bundled_catalog_dir()).arg("list");
    let output = run_command(cmd)?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("common/parameters/param_location\tstring\tDeployment Options\tCloud"));
    Ok(())
}

#[test]
fn show_prints_definition_json() -> Result<()> {
    let mut cmd = cli();
    cmd.arg("--catalog")
        .arg(bundled_catalog_dir())
        .args(["show", "param_costcenter"]);
    let output = run_command(cmd)?;
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["reference"], "common/parameters/param_costcenter");
    assert_eq!(
        value["definition"]["allowed_values"],
        json!(["Development", "QA", "Production"])
    );
    assert_eq!(value["definition"]["default"], "Development");
    Ok(())
}

#[test]
fn validate_accepts_and_defaults() -> Result<()> {
    let mut cmd = cli();
    cmd.arg("--catalog")
        .arg(bundled_catalog_dir())
        .args(["validate", "param_location", "--value", "AWS"]);
    let output = run_command(cmd)?;
    assert_eq!(String::from_utf8(output.stdout)?.trim(), "\"AWS\"");

    let mut cmd = cli();
    cmd.arg("--catalog")
        .arg(bundled_catalog_dir())
        .args(["validate", "param_location"]);
    let output = run_command(cmd)?;
    assert_eq!(String::from_utf8(output.stdout)?.trim(), "\"Google\"");
    Ok(())
}

#[test]
fn validate_rejects_value_outside_allowed_set() -> Result<()> {
    let mut cmd = cli();
    cmd.arg("--catalog")
        .arg(bundled_catalog_dir())
        .args(["validate", "param_location", "--value", "Oracle"]);
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(
        stderr.contains("[\"AWS\", \"Azure\", \"Google\", \"VMware\"]"),
        "{stderr}"
    );
    Ok(())
}

#[test]
fn collect_prints_mapping_and_reports_all_failures() -> Result<()> {
    let mut cmd = cli();
    cmd.arg("--catalog").arg(bundled_catalog_dir()).args([
        "collect",
        "--ref",
        "param_location",
        "--set",
        "param_costcenter=QA",
    ]);
    let output = run_command(cmd)?;
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        value,
        json!({"param_location": "Google", "param_costcenter": "QA"})
    );

    let mut cmd = cli();
    cmd.arg("--catalog").arg(bundled_catalog_dir()).args([
        "collect",
        "--set",
        "param_location=Oracle",
        "--set",
        "param_costcenter=42",
    ]);
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("2 parameter(s) rejected"), "{stderr}");
    assert!(stderr.contains("expects a string value, got a number"), "{stderr}");
    Ok(())
}

#[test]
fn ambiguous_unqualified_reference_fails() -> Result<()> {
    let dir = PackageDir::new()?;
    dir.write(
        "network.json",
        &package(
            "team/network",
            json!([string_param("param_location", &["eu"], Some("eu"))]),
        ),
    )?;
    let mut cmd = cli();
    cmd.arg("--catalog")
        .arg(bundled_catalog_dir())
        .arg("--catalog")
        .arg(dir.path())
        .args(["show", "param_location"]);
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("common/parameters, team/network"), "{stderr}");
    Ok(())
}

fn secret_catalog() -> Result<PackageDir> {
    let dir = PackageDir::new()?;
    let mut secret = string_param("db_password", &["hunter2", "swordfish"], Some("hunter2"));
    secret["no_echo"] = json!(true);
    dir.write("secrets.json", &package("team/secrets", json!([secret])))?;
    Ok(dir)
}

fn secret_cli(dir: &PackageDir) -> std::process::Command {
    let mut cmd = cli();
    cmd.arg("--catalog").arg(dir.path());
    cmd
}

fn assert_hidden(text: &str) {
    assert!(!text.contains("hunter2"), "{text}");
    assert!(!text.contains("swordfish"), "{text}");
}

#[test]
fn no_echo_literals_never_reach_cli_output() -> Result<()> {
    let dir = secret_catalog()?;

    let mut cmd = secret_cli(&dir);
    cmd.args(["show", "db_password"]);
    let output = run_command(cmd)?;
    let stdout = String::from_utf8(output.stdout)?;
    assert_hidden(&stdout);
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["definition"]["default"], "********");
    assert_eq!(value["definition"]["allowed_values"], json!(["********", "********"]));

    let mut cmd = secret_cli(&dir);
    cmd.args(["list", "--json"]);
    let output = run_command(cmd)?;
    assert_hidden(&String::from_utf8(output.stdout)?);

    let mut cmd = secret_cli(&dir);
    cmd.args(["validate", "db_password", "--value", "swordfish"]);
    let output = run_command(cmd)?;
    assert_eq!(String::from_utf8(output.stdout)?.trim(), "********");

    let mut cmd = secret_cli(&dir);
    cmd.args(["collect", "--set", "db_password=swordfish"]);
    let output = run_command(cmd)?;
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value, json!({"db_password": "********"}));

    let mut cmd = secret_cli(&dir);
    cmd.args(["validate", "db_password", "--value", "letmein"]);
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(!stderr.contains("letmein"), "{stderr}");
    assert_hidden(&stderr);
    Ok(())
}
