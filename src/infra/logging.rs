//! # Logging Module / 日志模块
//!
//! Diagnostic logging goes through `tracing` to stderr; user-facing progress
//! stays on stdout as colored, localized lines. `RUST_LOG` selects the level
//! (default `warn`, so retry notices are visible).
//!
//! 诊断日志通过 `tracing` 输出到 stderr；面向用户的进度信息以彩色、
//! 本地化的行输出到 stdout。`RUST_LOG` 用于选择日志级别（默认 `warn`）。

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
