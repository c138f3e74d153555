// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};
use validation_runner::infra::command::{ToolExecutor, ToolInvocation, ToolOutput};

type Responder = Box<dyn Fn(&ToolInvocation, u32) -> io::Result<ToolOutput> + Send + Sync>;

/// A fake tool that records every invocation and answers from a closure.
/// The closure receives the invocation and how many times that step has been
/// called so far (1-based).
pub struct ScriptedExecutor {
    calls: Mutex<Vec<ToolInvocation>>,
    respond: Responder,
}

impl ScriptedExecutor {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&ToolInvocation, u32) -> io::Result<ToolOutput> + Send + Sync + 'static,
    {
        Self { calls: Mutex::new(Vec::new()), respond: Box::new(respond) }
    }

    pub fn always_ok() -> Self {
        Self::new(|inv, _| match step_of(inv) {
            "init" => Ok(ToolOutput::success("Terraform has been successfully initialized!\n")),
            _ => Ok(ToolOutput::success("Success! The configuration is valid.\n")),
        })
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// The step name of every call, in order.
    pub fn steps(&self) -> Vec<String> {
        self.calls().iter().map(|c| step_of(c).to_string()).collect()
    }
}

impl ToolExecutor for ScriptedExecutor {
    async fn execute(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(invocation.clone());
            calls.iter().filter(|c| step_of(c) == step_of(invocation)).count() as u32
        };
        (self.respond)(invocation, attempt)
    }
}

pub fn step_of(invocation: &ToolInvocation) -> &str {
    invocation.args.first().map(String::as_str).unwrap_or("")
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Copies a fixture into a fresh temporary directory so the tool can write
/// its lock and cache files without touching the repository.
pub fn copy_fixture(name: &str) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    for entry in fs::read_dir(fixture(name)).expect("Failed to read fixture") {
        let entry = entry.unwrap();
        fs::copy(entry.path(), temp_dir.path().join(entry.file_name())).unwrap();
    }
    temp_dir
}

/// A shell script that behaves like the tool for `init` and `validate`:
/// - `init` creates `.terraform/` and a lock file, and prints how many times it ran
/// - `validate` fails on configurations containing `BROKEN` or on any `-var` flag
/// - while the file named by `$STUB_STATE` counts fewer than `$STUB_FAIL_TIMES`
///   calls, every call fails with a state-lock error
pub const STUB_TOOL: &str = r##"#!/bin/sh
if [ -n "$STUB_STATE" ]; then
  n=$(cat "$STUB_STATE" 2>/dev/null || echo 0)
  n=$((n + 1))
  echo "$n" > "$STUB_STATE"
  if [ "$n" -le "${STUB_FAIL_TIMES:-0}" ]; then
    echo "Error: Error acquiring the state lock" >&2
    exit 1
  fi
fi

case "$1" in
  init)
    mkdir -p .terraform
    runs=$(cat .terraform/init-count 2>/dev/null || echo 0)
    runs=$((runs + 1))
    echo "$runs" > .terraform/init-count
    echo "# stub lock file" > .terraform.lock.hcl
    echo "Terraform has been successfully initialized! (run $runs)"
    ;;
  validate)
    for arg in "$@"; do
      case "$arg" in
        -var*) echo "Error: validate does not accept $arg" >&2; exit 1 ;;
      esac
    done
    if grep -q BROKEN ./*.tf 2>/dev/null; then
      echo "Error: Missing name for resource" >&2
      exit 1
    fi
    echo "Success! The configuration is valid."
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 2
    ;;
esac
"##;

/// Writes the stub tool into `dir` and returns the tool command that runs it.
/// The script is run through `sh` so it never needs to be executable.
pub fn install_stub_tool(dir: &Path) -> String {
    let script = dir.join("stub-tool.sh");
    fs::write(&script, STUB_TOOL).expect("Failed to write stub tool");
    let path = script.to_string_lossy().into_owned();
    format!("sh {}", shlex::try_quote(&path).unwrap())
}
