//! Runs the `generate-arrays` binary.

use crate::read_back;
use rusty_numpy::generator::{catalog, Revision};
use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_generate-arrays");

#[test]
fn no_arguments_writes_data_folder() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(BIN).current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "Arrays saved in the data folder"
    );

    for (name, array) in catalog(Revision::R6) {
        let path = dir.path().join("data").join(format!("{}.npy", name));
        assert_eq!(read_back(&path), array, "{}", name);
    }
}

#[test]
fn revision_limits_the_files() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(BIN)
        .current_dir(dir.path())
        .args(["--revision", "3", "--output-dir", "out"])
        .status()
        .unwrap();
    assert!(status.success());
    let out = dir.path().join("out");
    assert!(out.join("array_3.npy").is_file());
    assert!(!out.join("array_4.npy").exists());
}

#[test]
fn failure_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data"), b"").unwrap();
    let output = Command::new(BIN).current_dir(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to create directory"));
}
