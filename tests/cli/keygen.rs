//! Tests for `hoard keygen`.

use crate::support::*;

#[test]
fn test_keygen_writes_identity() {
    let t = Test::new();

    let output = t.keygen("id.txt");
    assert_success(&output);

    let recipient = stdout(&output).trim().to_string();
    assert!(recipient.starts_with("age1"));

    let contents = std::fs::read_to_string(t.path("id.txt")).unwrap();
    assert!(contents.contains(&format!("# public key: {}", recipient)));
    assert!(contents.contains("AGE-SECRET-KEY-"));
}

#[cfg(unix)]
#[test]
fn test_keygen_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::new();
    assert_success(&t.keygen("id.txt"));

    let mode = std::fs::metadata(t.path("id.txt"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_keygen_refuses_overwrite() {
    let t = Test::new();
    assert_success(&t.keygen("id.txt"));
    let before = std::fs::read_to_string(t.path("id.txt")).unwrap();

    let output = t.keygen("id.txt");
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
    assert_eq!(std::fs::read_to_string(t.path("id.txt")).unwrap(), before);

    let output = t
        .cmd()
        .args(["keygen", "-o", "id.txt", "--force"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_ne!(std::fs::read_to_string(t.path("id.txt")).unwrap(), before);
}
