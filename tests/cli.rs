//! End-to-end tests of the `onebrc` and `create_measurements` binaries.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn input(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn onebrc() -> Command {
    Command::cargo_bin("onebrc").unwrap()
}

#[test]
fn reports_sorted_stats() {
    let file = input(b"Paris;10.0\nParis;20.0\nLondon;5.0\n");
    onebrc()
        .arg(file.path())
        .assert()
        .success()
        .stdout("London: 5.0/5.0/5.0\nParis: 10.0/15.0/20.0\n");
}

#[test]
fn every_strategy_and_read_mode_agrees() {
    let file = input(b"Paris;10.0\nParis;20.0\nLondon;5.0\n");
    for strategy in ["lines", "bytes", "queue", "serial"] {
        for read in ["mmap", "read"] {
            onebrc()
                .args(["--strategy", strategy, "--read", read, "-t", "3"])
                .arg(file.path())
                .assert()
                .success()
                .stdout("London: 5.0/5.0/5.0\nParis: 10.0/15.0/20.0\n");
        }
    }
}

#[test]
fn skips_line_without_delimiter() {
    let file = input(b"Paris;10.0\ngarbage\nParis;20.0\n");
    onebrc()
        .arg(file.path())
        .assert()
        .success()
        .stdout("Paris: 10.0/15.0/20.0\n");
}

#[test]
fn empty_file_fails() {
    let file = input(b"");
    onebrc()
        .arg(file.path())
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn final_line_without_terminator_counts() {
    let file = input(b"Oslo;-1.0\nOslo;3.0");
    onebrc()
        .arg(file.path())
        .assert()
        .success()
        .stdout("Oslo: -1.0/1.0/3.0\n");
}

#[test]
fn missing_argument_exits_with_one() {
    onebrc()
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_file_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    onebrc()
        .arg(dir.path().join("absent.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot open"));
}

#[test]
fn key_limit_fails_without_output() {
    let file = input(b"a;1\nb;2\nc;3\n");
    onebrc()
        .args(["--max-keys", "2"])
        .arg(file.path())
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("more than 2 distinct keys"));
}

#[test]
fn zero_threads_is_rejected() {
    let file = input(b"a;1\n");
    onebrc()
        .args(["-t", "0"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("thread count"));
}

#[test]
fn time_flag_appends_elapsed_line() {
    let file = input(b"a;1\n");
    onebrc()
        .arg("--time")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^a: 1\.0/1\.0/1\.0\nTime: \d+\.\d{6} seconds\n$").unwrap());
}

#[test]
fn runs_are_idempotent() {
    let file = input(&onebrc::generate::measurements(20_000, 3));
    let first = onebrc().arg(file.path()).output().unwrap();
    let second = onebrc().args(["-t", "5"]).arg(file.path()).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8(first.stdout).unwrap().lines().count(), 100);
}

#[test]
fn generator_output_is_aggregated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.txt");
    Command::cargo_bin("create_measurements")
        .unwrap()
        .arg("1000")
        .arg(&path)
        .assert()
        .success();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, onebrc::generate::measurements(1000, 10));

    onebrc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("New York: "));
}
