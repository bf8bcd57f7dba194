//! End-to-end execution tests over the fixture programs.

use assert_cmd::Command;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn expect_stdout(name: &str, expected: &str) {
    Command::cargo_bin("aspen")
        .expect("aspen binary builds")
        .arg(fixture(name))
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[test]
fn arithmetic() {
    expect_stdout("arithmetic.aspen", "7\n");
}

#[test]
fn string_concatenation() {
    expect_stdout("strings.aspen", "hi, world\n");
}

#[test]
fn while_loop() {
    expect_stdout("while.aspen", "0\n1\n2\n");
}

#[test]
fn for_loop() {
    expect_stdout("for_loop.aspen", "0\n1\n2\n");
}

#[test]
fn mutual_recursion() {
    expect_stdout("mutual_recursion.aspen", "true\n");
}

#[test]
fn closure_capture() {
    expect_stdout("closure.aspen", "42\n");
}

#[test]
fn numeric_cast() {
    expect_stdout("cast.aspen", "1.5\n");
}
