#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn flp() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_flp"));
    command.arg("--log-level").arg("error");
    command
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/flpcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    loop {
        if path.exists() {
            return;
        }
        if start.elapsed() >= timeout {
            panic!("socket did not appear");
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn run_with_input(args: &[&str], input: &str) -> Output {
    let mut child = flp()
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("run command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input.as_bytes())
        .expect("input should be written");

    child.wait_with_output().expect("run should exit")
}

/// Strip the `(timestamp)` so lines compare independently of the clock.
fn untimed(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| match (line.find('('), line.find(')')) {
            (Some(open), Some(close)) => format!("{}{}", &line[..open], &line[close + 1..]),
            _ => line.to_string(),
        })
        .collect()
}

#[test]
fn run_acknowledges_and_reports_over_stdio() {
    let output = run_with_input(
        &["--clock", "monotonic"],
        "led.set on=1 level=9\n\nmotor.set rpm=9000\nbogus\n@flp.version\n",
    );

    assert!(output.status.success());
    assert_eq!(
        untimed(&output.stdout),
        [
            "R led.level: 9",
            "R led.on: 1",
            "_ led.set: OK",
            "_ motor.set: ERR validation failed: rpm=9000",
            "_ bogus: ERR unknown qualifier: bogus",
            "_ @flp.version: 1.0.0",
        ]
    );
}

#[test]
fn run_honours_engine_flags() {
    let output = run_with_input(
        &["--no-ack", "--error-channel", "--strip-cr", "--strict"],
        "device.tick\r\ndevice.echo x=1\r\n",
    );

    assert!(output.status.success());
    assert_eq!(
        untimed(&output.stdout),
        [
            "R uptime.ticks: 1",
            "E device.echo: invalid argument: x=1 is not a declared argument",
        ]
    );
}

#[test]
fn serve_and_send_round_trip() {
    let dir = unique_temp_dir("serve");
    let sock_path = dir.join("device.sock");

    let mut server = flp()
        .arg("serve")
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("serve command should start");
    wait_for_socket(&sock_path, Duration::from_secs(3));

    let ok = flp()
        .args(["--format", "pretty", "send"])
        .arg(&sock_path)
        .arg("led.set level=42")
        .output()
        .expect("send should run");
    assert!(ok.status.success());
    assert_eq!(
        untimed(&ok.stdout),
        ["R led.level: 42", "_ led.set: OK"]
    );

    // State survives the previous client.
    let state = flp()
        .args(["--format", "json", "send"])
        .arg(&sock_path)
        .arg("@flp.state")
        .output()
        .expect("send should run");
    assert!(state.status.success());
    let stdout = String::from_utf8_lossy(&state.stdout);
    assert!(stdout.contains("\"tag\":\"@flp.state\""));
    assert!(stdout.contains("led.level"));

    let rejected = flp()
        .args(["--format", "pretty", "send"])
        .arg(&sock_path)
        .arg("motor.set")
        .output()
        .expect("send should run");
    assert_eq!(rejected.status.code(), Some(60));
    assert_eq!(
        untimed(&rejected.stdout),
        ["_ motor.set: ERR invalid argument: rpm is required"]
    );

    let _ = server.kill();
    let _ = server.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_times_out_without_ack() {
    let dir = unique_temp_dir("timeout");
    let sock_path = dir.join("silent.sock");
    let listener =
        std::os::unix::net::UnixListener::bind(&sock_path).expect("listener should bind");

    let holder = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("client should connect");
        thread::sleep(Duration::from_millis(800));
        drop::<UnixStream>(stream);
    });

    let output = flp()
        .arg("send")
        .arg(&sock_path)
        .arg("led.set on=1")
        .args(["--wait-timeout", "200ms"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(124));
    let _ = holder.join();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_socket_is_transport_error() {
    let dir = unique_temp_dir("missing");
    let output = flp()
        .arg("send")
        .arg(dir.join("absent.sock"))
        .arg("led.set on=1")
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn describe_lists_device_commands() {
    let output = flp()
        .args(["--format", "json", "describe"])
        .output()
        .expect("describe should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("describe should print JSON");
    assert!(value["commands"]["motor.set"].is_object());
    assert!(value["states"]
        .as_object()
        .is_some_and(|states| states.contains_key("uptime.ticks")));
}

#[test]
fn version_prints_name() {
    let output = flp().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("flp "));
}
