use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary home directory with a `.claude/projects` tree.
struct TestHome {
    dir: TempDir,
}

impl TestHome {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join(".claude/projects")).expect("Failed to create projects dir");
        Self { dir }
    }

    fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write_session(&self, relative: &str, lines: &[&str]) -> PathBuf {
        let path = self.path().join(".claude/projects").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("session-metrics").expect("Failed to find binary");
        cmd.env("HOME", self.path());
        cmd
    }
}

fn records(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

#[test]
fn test_jsonl_output() {
    let home = TestHome::new();
    let project = format!("{}/code/app", home.path().display());
    let user = format!(
        r#"{{"type":"user","sessionId":"s-1","cwd":"{}","gitBranch":"main","timestamp":"2026-02-21T10:00:00Z","message":{{"content":[{{"type":"tool_result","content":"Error: no such file"}}]}}}}"#,
        project
    );
    let assistant = r#"{"type":"assistant","timestamp":"2026-02-21T10:15:00Z","message":{"content":[{"type":"tool_use","name":"Read","input":{"file_path":"/a/b.py"}},{"type":"tool_use","name":"Edit","input":{"file_path":"/a/c.py"}}]}}"#;
    let path = home.write_session("-code-app/s-1.jsonl", &[user.as_str(), "garbage", assistant]);
    home.write_session("-code-app/subagents/agent-1.jsonl", &[r#"{"type":"user"}"#]);

    let output = home.command().assert().success().get_output().clone();
    let records = records(&output.stdout);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["session_id"], "s-1");
    assert_eq!(record["jsonl_path"], path.to_string_lossy().to_string());
    assert_eq!(record["project"], project.as_str());
    assert_eq!(record["git_branch"], "main");
    assert_eq!(record["start_time"], "2026-02-21T10:00:00+00:00");
    assert_eq!(record["end_time"], "2026-02-21T10:15:00+00:00");
    assert_eq!(record["duration_minutes"], 15.0);
    assert_eq!(record["tool_counts"]["Read"], 1);
    assert_eq!(record["total_tool_calls"], 2);
    assert_eq!(record["errors"]["count"], 1);
    assert_eq!(record["errors"]["samples"][0], "Error: no such file");
    assert_eq!(record["messages"]["total"], 2);
    assert_eq!(record["files"]["read_list"][0], "/a/b.py");
    assert_eq!(record["files"]["edited_list"][0], "/a/c.py");
    assert_eq!(record["subagent_count"], 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Found 1 session files"));
}

#[test]
fn test_jsonl_skips_unparseable_sessions() {
    let home = TestHome::new();
    home.write_session("p/a.jsonl", &[r#"{"type":"user","sessionId":"a"}"#]);
    home.write_session("p/b.jsonl", &["not json", "still not json"]);
    home.write_session("p/c.jsonl", &[r#"{"type":"system","sessionId":"c"}"#]);

    let output = home.command().assert().success().get_output().clone();
    let ids: Vec<Value> = records(&output.stdout)
        .into_iter()
        .map(|r| r["session_id"].clone())
        .collect();
    assert_eq!(ids, vec![Value::from("a"), Value::from("c")]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Found 3 session files"));
}

#[test]
fn test_blank_and_non_object_lines_yield_no_record() {
    let home = TestHome::new();
    home.write_session("p/noise.jsonl", &["", "   ", "[1,2]", "\"text\"", "42", "null"]);

    home.command()
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Found 1 session files"));
}

#[test]
fn test_empty_summary() {
    let home = TestHome::new();
    home.command()
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions analyzed: 0"))
        .stdout(predicate::str::contains("Total duration: 0 minutes (0.0 hours)"))
        .stdout(predicate::str::contains("-0").not());
}

#[test]
fn test_missing_projects_dir() {
    let home = TestHome::empty();
    home.command()
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Claude directory not found"))
        .stderr(predicate::str::contains("Found 0 session files"));
}

#[test]
fn test_summary_output() {
    let home = TestHome::new();
    let project = format!("{}/code/app", home.path().display());
    let start = format!(
        r#"{{"type":"user","cwd":"{}","timestamp":"2026-02-21T10:00:00Z"}}"#,
        project
    );
    let end = r#"{"type":"assistant","timestamp":"2026-02-21T10:40:00Z","message":{"content":[{"type":"tool_use","name":"Bash","input":{"command":"ls"}}]}}"#;
    home.write_session("-code-app/one.jsonl", &[start.as_str(), end]);
    home.write_session(
        "-code-lib/two.jsonl",
        &[r#"{"type":"user","message":{"content":[{"type":"tool_result","is_error":true,"content":"boom"}]}}"#],
    );

    home.command()
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("=".repeat(60)))
        .stdout(predicate::str::contains("Sessions analyzed: 2"))
        .stdout(predicate::str::contains("Total duration: 40 minutes (0.7 hours)"))
        .stdout(predicate::str::contains("  Bash: 1"))
        .stdout(predicate::str::contains("  ~/code/app: 1 sessions, 40 min"))
        .stdout(predicate::str::contains("  unknown: 1 sessions, 0 min"))
        .stdout(predicate::str::contains("  40 min - ~/code/app"))
        .stdout(predicate::str::contains("  1 errors - \n    → boom..."));
}

#[test]
fn test_rejects_unknown_flags() {
    let home = TestHome::new();
    home.command().arg("--verbose").assert().failure();
}
