#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/rawdump-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn header(id: u64, lost: bool, n_events: u64) -> [u64; 2] {
    let size = 2 + n_events;
    [(size << 36) | id, (u64::from(lost) << 16) | n_events]
}

fn event(port: u64, slave: u64, chip: u64, channel: u64, tac: u64) -> u64 {
    let channel_id = (port << 17) | (slave << 12) | (chip << 6) | channel;
    (channel_id << 42) | (tac << 40) | (100 << 30) | (200 << 20) | (300 << 10) | 400
}

fn to_bytes(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Two windows: frames 1 (kept, one event) and 4 (lost), then 10 (lost) and 12 (kept).
fn write_run(dir: &Path, index: &str) -> PathBuf {
    let mut words = Vec::new();
    words.extend(header(1, false, 1));
    words.push(event(1, 2, 3, 4, 2));
    words.extend(header(4, true, 0));
    words.extend(header(10, true, 0));
    words.extend(header(12, false, 0));

    let prefix = dir.join("run");
    std::fs::write(dir.join("run.rawf"), to_bytes(&words)).expect("data should be writable");
    std::fs::write(dir.join("run.idxf"), index).expect("index should be writable");
    prefix
}

const INDEX: &str = "0 40 0 0 0.5 1.5\n40 72 0 0 0.5 2.5\n";

fn rawdump(args: &[&str], prefix: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rawdump"))
        .args(["--log-level", "error"])
        .args(args)
        .arg("-i")
        .arg(prefix)
        .output()
        .expect("rawdump should run")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn dump_prints_frames_and_window_stats() {
    let dir = unique_temp_dir("dump");
    let prefix = write_run(&dir, INDEX);

    let output = rawdump(&["dump"], &prefix);
    assert!(output.status.success());
    let lines = stdout_lines(&output);

    assert!(lines[0].starts_with("0000 "));
    assert!(lines[0].contains("Size: 3    FrameID: 1 "));
    assert!(lines[2].contains("ChannelID: (01 02 03 04) TacID: 2"));
    assert!(lines.iter().any(|l| l.contains("FrameID: 4 ")));
    assert!(lines.iter().any(|l| l.ends_with("LOST")));

    let stats: Vec<&String> = lines.iter().filter(|l| l.starts_with("STAT")).collect();
    assert_eq!(stats, ["STAT 4 1 1", "STAT 3 2 0"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stats_only_prints_only_stat_lines() {
    let dir = unique_temp_dir("statsonly");
    let prefix = write_run(&dir, INDEX);

    let output = rawdump(&["dump", "--stats-only"], &prefix);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), ["STAT 4 1 1", "STAT 3 2 0"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn suppress_empty_hides_frames_without_events() {
    let dir = unique_temp_dir("suppress");
    let prefix = write_run(&dir, INDEX);

    let output = rawdump(&["dump", "--suppress-empty"], &prefix);
    assert!(output.status.success());
    let lines = stdout_lines(&output);

    assert!(lines.iter().any(|l| l.contains("FrameID: 1 ")));
    for id in [4, 10, 12] {
        let needle = format!("FrameID: {id} ");
        assert!(!lines.iter().any(|l| l.contains(&needle)), "{needle}");
    }
    // Suppressed frames still count.
    assert_eq!(lines.last().map(String::as_str), Some("STAT 3 2 0"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stats_json_reports_windows_and_totals() {
    let dir = unique_temp_dir("stats");
    let prefix = write_run(&dir, INDEX);

    let output = rawdump(&["--format", "json", "stats"], &prefix);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3);

    let first: serde_json::Value = serde_json::from_str(&lines[0]).expect("valid json");
    assert_eq!(first["kind"], "window");
    assert_eq!(first["line"], 1);
    assert_eq!(first["end_offset"], 40);
    assert_eq!(first["total_frames"], 4);
    assert_eq!(first["lost_frames"], 1);

    let summary: serde_json::Value = serde_json::from_str(&lines[2]).expect("valid json");
    assert_eq!(summary["kind"], "summary");
    assert_eq!(summary["windows"], 2);
    assert_eq!(summary["total_frames"], 7);
    assert_eq!(summary["lost_frames"], 3);
    assert_eq!(summary["total_events"], 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn index_command_echoes_records() {
    let dir = unique_temp_dir("index");
    let prefix = write_run(&dir, INDEX);

    let output = rawdump(&["--format", "pretty", "index"], &prefix);
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        ["0 40 0 0 0.5 1.5", "40 72 0 0 0.5 2.5"]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn repeated_frame_id_exits_with_data_invalid() {
    let dir = unique_temp_dir("nonmono");
    let mut words = Vec::new();
    words.extend(header(5, false, 0));
    words.extend(header(5, false, 0));
    std::fs::write(dir.join("run.rawf"), to_bytes(&words)).expect("data should be writable");
    std::fs::write(dir.join("run.idxf"), "0 32 0 0 0 0\n").expect("index should be writable");

    let output = rawdump(&["dump", "--stats-only"], &dir.join("run"));
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("frame ID 5"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn truncated_window_exits_with_data_invalid() {
    let dir = unique_temp_dir("truncated");
    let prefix = write_run(&dir, "0 30 0 0 0 0\n");

    let output = rawdump(&["dump"], &prefix);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_index_stops_unless_strict() {
    let dir = unique_temp_dir("badindex");
    let prefix = write_run(&dir, "0 40 0 0 0.5 1.5\nnot an index line\n40 72 0 0 0.5 2.5\n");

    let output = rawdump(&["dump", "--stats-only"], &prefix);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), ["STAT 4 1 1"]);

    let output = rawdump(&["dump", "--stats-only", "--strict-index"], &prefix);
    assert_eq!(output.status.code(), Some(60));
    assert_eq!(stdout_lines(&output), ["STAT 4 1 1"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn binary_index_line_stops_unless_strict() {
    let dir = unique_temp_dir("binindex");
    let prefix = write_run(&dir, "");
    let mut index = b"0 40 0 0 0.5 1.5\n".to_vec();
    index.extend_from_slice(b"\xff\xfe garbage\n40 72 0 0 0.5 2.5\n");
    std::fs::write(dir.join("run.idxf"), index).expect("index should be writable");

    let output = rawdump(&["dump", "--stats-only"], &prefix);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), ["STAT 4 1 1"]);

    let output = rawdump(&["dump", "--stats-only", "--strict-index"], &prefix);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_files_exit_with_failure() {
    let dir = unique_temp_dir("missing");

    let output = rawdump(&["dump"], &dir.join("absent"));
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.idxf"));

    let _ = std::fs::remove_dir_all(&dir);
}
