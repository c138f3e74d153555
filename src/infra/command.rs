//! # Command Execution Module / 命令执行模块
//!
//! This module launches the external tool and captures what it prints.
//! [`ToolExecutor`] is the seam the validation runner talks to;
//! [`ProcessExecutor`] is the implementation backed by real processes.
//!
//! 此模块负责启动外部工具并捕获其输出。
//! [`ToolExecutor`] 是验证运行器所依赖的接口；
//! [`ProcessExecutor`] 是基于真实进程的实现。

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::infra::t;

/// A fully resolved command line for one step.
/// 单个步骤的完整命令行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl ToolInvocation {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Builds the `tokio` command. The child is killed if the future awaiting it is dropped.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .current_dir(&self.working_dir)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(line) => f.write_str(&line),
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}

/// The result of a process that ran to completion.
/// 运行完成的进程结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self { success: true, exit_code: Some(0), output: output.into() }
    }

    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        Self { success: false, exit_code: Some(exit_code), output: output.into() }
    }
}

/// Runs tool invocations.
///
/// An `Err` means the tool could not be run at all; a tool that ran and
/// failed is an `Ok` with `success == false`.
pub trait ToolExecutor: Send + Sync {
    fn execute(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = std::io::Result<ToolOutput>> + Send;
}

impl<E: ToolExecutor> ToolExecutor for Arc<E> {
    fn execute(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = std::io::Result<ToolOutput>> + Send {
        (**self).execute(invocation)
    }
}

/// Spawns each invocation as a child process.
/// 将每次调用作为子进程派生。
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ToolExecutor for ProcessExecutor {
    async fn execute(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutput> {
        debug!(command = %invocation, dir = %invocation.working_dir.display(), "spawning tool");
        let (status, output) = spawn_and_capture(invocation.to_command()).await;
        let status = status?;
        Ok(ToolOutput {
            success: status.success(),
            exit_code: status.code(),
            output,
        })
    }
}

/// Runs `cmd` to completion and returns its exit status together with
/// everything it printed.
///
/// Both pipes are drained concurrently into one buffer, line by line in the
/// order they arrive. Lines are read as raw bytes and decoded lossily, so a
/// stray non-UTF-8 byte costs one replacement character, never the rest of
/// the stream.
///
/// 运行 `cmd` 直到结束，返回退出状态以及其全部输出。
/// 两个管道并发读取到同一缓冲区；按字节读取后有损解码，非 UTF-8 字节不会截断后续输出。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<std::process::ExitStatus>, String) {
    cmd.stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let Some(stdout) = child.stdout.take() else {
        return (
            Err(std::io::Error::other(t!("command.capture_stdout_failed").to_string())),
            String::new(),
        );
    };
    let Some(stderr) = child.stderr.take() else {
        return (
            Err(std::io::Error::other(t!("command.capture_stderr_failed").to_string())),
            String::new(),
        );
    };

    let sink = Arc::new(Mutex::new(String::new()));
    let readers = [
        tokio::spawn(drain_lines(stdout, Arc::clone(&sink), "stdout")),
        tokio::spawn(drain_lines(stderr, Arc::clone(&sink), "stderr")),
    ];

    let status = child.wait().await;
    for reader in readers {
        if let Err(e) = reader.await {
            warn!("output reader task failed: {e}");
        }
    }

    let captured = std::mem::take(&mut *sink.lock().await);
    (status, captured)
}

/// Appends every line of `stream` to `sink` until EOF or a read error.
async fn drain_lines<R>(stream: R, sink: Arc<Mutex<String>>, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let mut sink = sink.lock().await;
                sink.push_str(text.trim_end_matches(['\r', '\n']));
                sink.push('\n');
            }
            Err(e) => {
                warn!(stream = name, "stopped reading tool output: {e}");
                break;
            }
        }
    }
}
