//! End-to-end tests of the `tofu-release publish-gem` argument handling.

use std::process::{Command, Output};

fn publish_gem(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tofu-release"))
        .arg("publish-gem")
        .args(args)
        .env("RUBYGEMS_API_KEY", "rubygems_unused")
        .env("GEM_REGISTRY_URL", "http://127.0.0.1:9")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tofu-release")
}

/// Test: no version argument exits 1 with the message on stdout
#[test]
fn test_missing_version_exits_with_status_one() {
    let output = publish_gem(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "No version specified.\n"
    );
}

/// Test: a blank version is treated as missing
#[test]
fn test_blank_version_exits_with_status_one() {
    let output = publish_gem(&["  "]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "No version specified.\n"
    );
}
