//! Tests for `hoard export`.

use serde_json::json;

use hoard::core::cipher::{self, Envelope};
use hoard::core::domain::Folder;

use crate::support::*;

fn vault() -> FakeVault {
    FakeVault::builder()
        .kv2_mount("secret/")
        .kv1_mount("legacy/")
        .kv2_secret("secret/", "app/db", json!({"password": "hunter2"}))
        .kv2_secret("secret/", "app/api", json!({"key": "sk-test"}))
        .kv1_secret("legacy/", "svc", json!({"token": "abc"}))
        .start()
}

#[test]
fn test_export_all_json_to_stdout() {
    let t = Test::new();

    let output = t.export(&vault(), "/", &["-f", "json"]);
    assert_success(&output);

    let doc = stdout_json(&output);
    assert_eq!(doc[0]["path"], json!("legacy/"));
    assert_eq!(doc[0]["secrets"]["svc"]["token"], json!("abc"));
    assert_eq!(doc[1]["path"], json!("secret/"));
    assert_eq!(
        doc[1]["children"][0]["secrets"]["db"]["password"],
        json!("hunter2")
    );
    assert_stderr_contains(&output, "secrets");
}

#[test]
fn test_export_defaults_to_yaml() {
    let t = Test::new();

    let output = t.export(&vault(), "secret/app", &[]);
    assert_success(&output);

    let folders: Vec<Folder> = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].path(), "secret/app/");
    assert_eq!(folders[0].secret_count(), 2);
}

#[test]
fn test_export_to_file() {
    let t = Test::new();
    let out = t.path("backup.json");

    let output = t.export(
        &vault(),
        "legacy/",
        &["-f", "json", "-o", out.to_str().unwrap()],
    );
    assert_success(&output);
    assert!(output.stdout.is_empty());
    assert_stderr_contains(&output, "wrote");

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc[0]["secrets"]["svc"]["token"], json!("abc"));
}

#[test]
fn test_export_encrypted() {
    let t = Test::new();
    assert_success(&t.keygen("id.txt"));
    let identity_path = t.path("id.txt");
    let out = t.path("backup.enc");

    let output = t.export(
        &vault(),
        "/",
        &[
            "-e",
            "-p",
            identity_path.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert_success(&output);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(!text.contains("hunter2"));
    assert_eq!(text.lines().nth(1), Some("-----BEGIN AGE ENCRYPTED FILE-----"));

    let identity = cipher::load_identity(&identity_path).unwrap();
    let plaintext = cipher::open(&Envelope::parse(&text).unwrap(), &identity).unwrap();
    let folders: Vec<Folder> = serde_yaml::from_slice(&plaintext).unwrap();
    assert_eq!(folders.len(), 2);
}

#[test]
fn test_partial_export_succeeds_with_warning() {
    let t = Test::new();
    let vault = FakeVault::builder()
        .kv2_mount("secret/")
        .kv1_mount("team/")
        .kv2_secret("secret/", "k", json!({"v": 1}))
        .kv1_secret("team/", "k", json!({"v": 2}))
        .deny("team/")
        .start();

    let output = t.export(&vault, "/", &["-f", "json"]);
    assert_success(&output);

    let doc = stdout_json(&output);
    assert_eq!(doc.as_array().unwrap().len(), 1);
    assert_stderr_contains(&output, "skipped team/");
}

#[test]
fn test_failed_export_writes_nothing() {
    let t = Test::new();
    let out = t.path("backup.yaml");
    let vault = FakeVault::builder()
        .kv2_mount("secret/")
        .deny("sys/mounts")
        .start();

    let output = t.export(&vault, "/", &["-o", out.to_str().unwrap()]);
    assert_failure(&output);
    assert_stderr_contains(&output, "mount discovery failed");
    assert!(!out.exists());
}

#[test]
fn test_missing_path_fails() {
    let t = Test::new();

    let output = t.export(&vault(), "secret/nope", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "path not found: secret/nope/");
}

#[test]
fn test_unsupported_format_fails() {
    let t = Test::new();

    let output = t.export(&vault(), "/", &["-f", "xml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unsupported format 'xml'");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_engine_flag_overrides_detection() {
    let t = Test::new();

    // legacy/ is kv1; reading it as kv2 finds nothing.
    let output = t.export(&vault(), "legacy/", &["-m", "kv2"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "path not found");
}

#[test]
fn test_config_file_supplies_defaults() {
    let t = Test::new();
    let vault = vault();
    t.write(
        ".hoard.toml",
        &format!(
            "[vault]\naddress = \"{}\"\n\n[export]\nformat = \"json\"\n",
            vault.address
        ),
    );

    let output = t
        .cmd()
        .args(["export", "legacy/", "--token", &vault.token])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout_json(&output)[0]["path"], json!("legacy/"));
}

#[test]
fn test_env_vars_supply_connection() {
    let t = Test::new();
    let vault = vault();

    let output = t
        .cmd()
        .args(["export", "legacy/", "-f", "json"])
        .env("VAULT_ADDR", &vault.address)
        .env("VAULT_TOKEN", &vault.token)
        .output()
        .unwrap();
    assert_success(&output);
}
