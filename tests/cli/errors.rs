//! Tests for error handling and CLI flags.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export").and(predicate::str::contains("keygen")));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hoard"));
}

#[test]
fn test_missing_address_fails() {
    let t = Test::new();

    t.cmd()
        .args(["export", "/", "--token", TEST_TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no vault address"))
        .stderr(predicate::str::contains("VAULT_ADDR"));
}

#[test]
fn test_missing_token_fails() {
    let t = Test::new();

    t.cmd()
        .args(["export", "/", "--address", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no vault token"));
}

#[test]
fn test_encrypt_without_key_fails() {
    let t = Test::new();
    let out = t.path("backup.enc");

    t.cmd()
        .args(["export", "/", "-e", "-o", out.to_str().unwrap()])
        .args(["--address", "http://127.0.0.1:1", "--token", TEST_TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--encrypt requires --public-key"));
    assert!(!out.exists());
}

#[test]
fn test_invalid_public_key_fails() {
    let t = Test::new();

    t.cmd()
        .args(["export", "/", "-e", "-p", INVALID_PUBLIC_KEY])
        .args(["--address", "http://127.0.0.1:1", "--token", TEST_TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid public key"));
}

#[test]
fn test_token_in_config_rejected() {
    let t = Test::new();
    t.write(".hoard.toml", "[vault]\ntoken = \"hvs.leak\"\n");

    t.cmd()
        .args(["export", "/", "--token", TEST_TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vault.token"));
}

#[test]
fn test_unreachable_vault_fails() {
    let t = Test::new();

    t.cmd()
        .args(["export", "/", "--address", "http://127.0.0.1:1", "--token", TEST_TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mount discovery failed"));
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("_hoard") || out.contains("complete"));
}

#[test]
fn test_completions_unknown_shell_fails() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "tcsh"]).output().unwrap();
    assert_failure(&output);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_completions_all_shells() {
    let t = Test::new();

    for shell in ["zsh", "fish", "powershell", "elvish"] {
        let output = t.cmd().args(["completions", shell]).output().unwrap();
        assert_success(&output);
        assert!(!stdout(&output).is_empty(), "{} completions empty", shell);
    }
}
