//! Shared helpers for the binary integration tests.
#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Path to the compiled `opnscope` binary.
pub fn opnscope_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("opnscope");
    path
}

/// Path to a shared fixture file.
pub fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

/// Runs the binary with the given arguments.
pub fn run(args: &[&str]) -> Output {
    Command::new(opnscope_bin())
        .args(args)
        .env_remove("OPNSCOPE_MAX_FILE_SIZE")
        .env_remove("OPNSCOPE_TIMEOUT")
        .env("NO_COLOR", "1")
        .output()
        .expect("run opnscope")
}

/// Stdout as UTF-8.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as UTF-8.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Fixture path as a `String` argument.
pub fn fixture_arg(name: &str) -> String {
    fixture(name).display().to_string()
}
