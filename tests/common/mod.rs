// Shared test helpers for integration tests, used by cli_contract.rs and cli_flows.rs.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

pub const HOOK: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

pub fn binary_path() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_slatemess"));
    assert!(path.exists(), "binary not found at {}", path.display());
    path
}

/// An isolated invocation: empty environment, scratch working directory.
pub struct Invocation {
    dir: TempDir,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    stdin: String,
}

pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl Invocation {
    pub fn new() -> Self {
        Invocation {
            dir: TempDir::new().expect("failed to create temp dir"),
            args: Vec::new(),
            envs: Vec::new(),
            stdin: String::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn stdin(mut self, input: &str) -> Self {
        self.stdin = input.to_string();
        self
    }

    /// Write a file into the scratch directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write fixture");
        path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn run(self) -> Outcome {
        let mut cmd = Command::new(binary_path());
        cmd.env_clear()
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(self.dir.path())
            .args(&self.args);
        let output = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .and_then(|mut child| {
                use std::io::{ErrorKind, Write};
                let write_result = child
                    .stdin
                    .take()
                    .unwrap()
                    .write_all(self.stdin.as_bytes());
                if let Err(e) = write_result {
                    if e.kind() != ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
                child.wait_with_output()
            })
            .expect("failed to execute binary");

        Outcome {
            stdout: String::from_utf8(output.stdout).expect("stdout not valid UTF-8"),
            stderr: String::from_utf8(output.stderr).expect("stderr not valid UTF-8"),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

/// Extract the JSON body from a dry-run `curl … --data '<json>'` line.
pub fn dry_run_payload(stdout: &str) -> serde_json::Value {
    let line = stdout.trim();
    assert!(line.starts_with("curl -X POST"), "not a curl command: {line}");
    let start = line.find("--data '").expect("missing --data") + "--data '".len();
    let body = line[start..]
        .strip_suffix('\'')
        .expect("payload should be single-quoted")
        .replace(r"'\''", "'");
    serde_json::from_str(&body).expect("dry-run payload should be valid JSON")
}
