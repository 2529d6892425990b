#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end tests running the `sigmafw` and `sigmafw-inspect` binaries

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};

const DSP_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Schematic>
  <IC>
    <Program>
      <Name>Program Data</Name>
      <Address>16</Address>
      <Size>4</Size>
      <Data>0x01, 0x02, 0x03, 0x04, </Data>
    </Program>
    <Module>
      <CellName>EQ</CellName>
      <ModuleParameter>
        <Name>Gain</Name>
        <Address>32</Address>
        <Size>2</Size>
      </ModuleParameter>
    </Module>
  </IC>
</Schematic>
"#;

const EXPECTED_IMAGE: &[u8] = &[
    0x41, 0x44, 0x49, 0x53, 0x49, 0x47, 0x4D, 0x02, 0x29, 0xE0, 0x8F, 0x8B, 0x12, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x01, 0x02, 0x03, 0x04, 0xAA, 0xAA,
    0x19, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00,
    0x02, 0x00, 0x45, 0x51, 0x20, 0x47, 0x61, 0x69, 0x6E, 0xAA, 0xAA, 0xAA, 0x10, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0xBB, 0x00, 0x00,
];

fn command(bin: &str, dir: &Path) -> Command {
    let mut command = Command::new(bin);
    command
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("SIGMAFW_LOG")
        .env_remove("SIGMAFW_BUFFERED")
        .env_remove("SIGMAFW_VERIFY");
    command
}

fn sigmafw(dir: &Path, args: &[&str]) -> Output {
    command(env!("CARGO_BIN_EXE_sigmafw"), dir)
        .args(args)
        .output()
        .expect("Failed to run sigmafw")
}

fn inspect(dir: &Path, args: &[&str]) -> Output {
    command(env!("CARGO_BIN_EXE_sigmafw-inspect"), dir)
        .args(args)
        .output()
        .expect("Failed to run sigmafw-inspect")
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    std::fs::write(dir.path().join("dsp.xml"), DSP_XML).expect("Failed to write test XML");
    dir
}

#[test]
fn builds_image() {
    let dir = workspace();
    let output = sigmafw(dir.path(), &["dsp.xml", "48000", "dsp.bin"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        std::fs::read(dir.path().join("dsp.bin")).unwrap(),
        EXPECTED_IMAGE
    );
}

#[test]
fn buffered_verified_build_matches() {
    let dir = workspace();
    let output = sigmafw(
        dir.path(),
        &["--buffered", "--verify", "dsp.xml", "48000", "dsp.bin"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        std::fs::read(dir.path().join("dsp.bin")).unwrap(),
        EXPECTED_IMAGE
    );
}

#[test]
fn env_enables_verification() {
    let dir = workspace();
    let output = command(env!("CARGO_BIN_EXE_sigmafw"), dir.path())
        .env("SIGMAFW_VERIFY", "true")
        .env("SIGMAFW_LOG", "info")
        .args(["dsp.xml", "48000", "dsp.bin"])
        .output()
        .expect("Failed to run sigmafw");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Verified"));
}

#[test]
fn usage_errors_exit_one_without_output() {
    let dir = workspace();
    for args in [
        &[][..],
        &["dsp.bin"],
        &["dsp.xml", "dsp.bin"],
        &["dsp.xml", "48000", "dsp.xml", "dsp.bin"],
        &["dsp.xml", "fast", "dsp.bin"],
    ] {
        let output = sigmafw(dir.path(), args);
        assert_eq!(output.status.code(), Some(1), "args: {args:?}");
        assert!(!output.stderr.is_empty());
        assert!(!dir.path().join("dsp.bin").exists(), "args: {args:?}");
    }
}

#[test]
fn help_exits_zero() {
    let dir = workspace();
    let output = sigmafw(dir.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("sigmafw"));
}

#[test]
fn bad_input_fails_without_output() {
    let dir = workspace();
    std::fs::write(dir.path().join("bad.xml"), "<Schematic><Program>").unwrap();

    for input in ["bad.xml", "absent.xml"] {
        let output = sigmafw(dir.path(), &[input, "48000", "dsp.bin"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains(input));
        assert!(!dir.path().join("dsp.bin").exists());
    }
}

#[test]
fn inspect_lists_chunks() {
    let dir = workspace();
    std::fs::write(dir.path().join("dsp.bin"), EXPECTED_IMAGE).unwrap();

    let output = inspect(dir.path(), &["--hex", "dsp.bin"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("checksum 0x8b8fe029"));
    assert!(stdout.contains("source 0: 48000 Hz"));
    assert!(stdout.contains("\"EQ Gain\""));
    assert!(stdout.contains("01020304"));
}

#[test]
fn inspect_rejects_corrupt_image() {
    let dir = workspace();
    let mut corrupt = EXPECTED_IMAGE.to_vec();
    corrupt[30] = 0x00;
    std::fs::write(dir.path().join("dsp.bin"), corrupt).unwrap();

    let output = inspect(dir.path(), &["dsp.bin"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("checksum mismatch"));
}
