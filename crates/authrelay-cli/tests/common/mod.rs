//! Helpers for running the `authrelay` binary in isolation.

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Run the CLI with a custom HOME directory for isolated session storage.
pub async fn run_cli_with_env(args: &[&str], home: &Path, base_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authrelay"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("AUTHRELAY_BASE_URL", base_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME and expect success.
pub async fn run_cli_with_env_success(args: &[&str], home: &Path, base_url: &str) -> String {
    let output = run_cli_with_env(args, home, base_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with a custom HOME and expect failure; returns stderr.
pub async fn run_cli_with_env_failure(args: &[&str], home: &Path, base_url: &str) -> String {
    let output = run_cli_with_env(args, home, base_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
