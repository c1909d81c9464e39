//! Runs the built check_memory binary the way a supervisor would
//!
//! Meminfo is fed on stdin (`-m -`) so no test depends on the host's /proc.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const OLD_KERNEL_MEMINFO: &str = "MemTotal: 10000 kB\nMemFree: 1000 kB\nBuffers: 200 kB\nCached: 300 kB\nSReclaimable: 100 kB\n";

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_check_memory"))
        .args(args)
        .env_remove("MEMPROBE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_stdin_source_warning() {
    let output = run_with_stdin(
        &["-m", "-", "--config", "/dev/null"],
        OLD_KERNEL_MEMINFO.as_bytes(),
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "WARNING - 16.0% (1MB) memory available | available_memory=16.0%;25:;10:;0;100\n"
    );
}

#[test]
fn test_stdin_with_junk_bytes_still_measures() {
    let mut input = b"MemTotal: 10000 kB\n\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(b"MemFree: 3000 kB\nBuffers: 200 kB\nCached: 300 kB\n");
    let output = run_with_stdin(&["-m", "-", "--config", "/dev/null"], &input);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("OK - 35.0% "));
}

#[test]
fn test_double_verbose_dumps_fields_to_stderr() {
    let output = run_with_stdin(
        &["-m", "-", "-vv", "--config", "/dev/null"],
        OLD_KERNEL_MEMINFO.as_bytes(),
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // stdout stays a single status line
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("(via MemFree+Buffers+Cached+SReclaimable)"));
    assert_eq!(stderr.matches("meminfo field").count(), 5);
    assert!(stderr.contains("SReclaimable"));
}

#[test]
fn test_missing_field_on_stdin_is_unknown() {
    let output = run_with_stdin(&["-m", "-", "--config", "/dev/null"], b"MemTotal: 10000 kB\n");

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "UNKNOWN - required field MemFree not found in meminfo\n"
    );
}

#[test]
fn test_bad_arguments_are_unknown() {
    let output = run_with_stdin(&["--no-such-flag"], b"");

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "UNKNOWN - invalid arguments\n"
    );
}
