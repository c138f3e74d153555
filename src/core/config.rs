//! # Configuration Module / 配置模块
//!
//! The validation matrix: global tool settings plus the static, ordered list
//! of test cases, loaded from a TOML file.
//!
//! 验证矩阵：全局工具设置以及静态、有序的测试用例列表，从 TOML 文件加载。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::options::{InvocationOptions, DEFAULT_TOOL};
use crate::core::retry::{BackoffPolicy, RetryableError};
use crate::infra::{fs as infra_fs, t};

/// A single configuration directory to validate.
/// 代表一个需要验证的配置目录。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestCase {
    /// The unique name for the test case, used for identification in logs.
    /// 测试用例的唯一名称，用于在日志中进行识别。
    pub name: String,
    /// The configuration directory. Relative paths are anchored to the
    /// directory holding the matrix file; `~` and `$VAR` are expanded.
    ///
    /// 配置目录。相对路径以矩阵文件所在目录为基准；支持 `~` 和 `$VAR` 展开。
    pub dir: PathBuf,
    /// Whether `init` + `validate` is expected to succeed.
    /// 预期 `init` + `validate` 是否成功。
    #[serde(default = "default_true")]
    pub expect_success: bool,
}

/// Backoff settings as written in the matrix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackoffConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl From<BackoffConfig> for BackoffPolicy {
    fn from(config: BackoffConfig) -> Self {
        BackoffPolicy::from_millis(config.initial_delay_ms, config.max_delay_ms, config.multiplier)
    }
}

/// Represents the entire validation matrix, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个验证矩阵。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationMatrix {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Tool command, optionally with leading arguments.
    /// 工具命令，可带前置参数。
    #[serde(default = "default_tool")]
    pub tool: String,

    #[serde(default = "default_true")]
    pub no_color: bool,

    /// Whether the built-in retryable patterns apply.
    /// 是否启用内置的可重试模式。
    #[serde(default = "default_true")]
    pub default_retryable_errors: bool,

    /// Extra patterns, consulted after the built-in ones.
    #[serde(default)]
    pub retryable_errors: Vec<RetryableError>,

    #[serde(default)]
    pub backoff: BackoffConfig,

    /// A vector containing all the test cases to be potentially executed.
    /// 一个包含所有可能被执行的测试用例的向量。
    pub cases: Vec<TestCase>,
}

impl ValidationMatrix {
    /// Fresh options for `case`. Call once per case.
    /// 为 `case` 构造新的调用选项，每个用例调用一次。
    pub fn invocation_options(&self, case: &TestCase) -> InvocationOptions {
        let mut builder = InvocationOptions::builder(case.dir.clone())
            .no_color(self.no_color)
            .tool_binary(self.tool.clone())
            .backoff(self.backoff.into());
        if self.default_retryable_errors {
            builder = builder.default_retryable_errors();
        }
        builder.retryable_errors(self.retryable_errors.iter().cloned()).build()
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            bail!("{}", t!("config.no_cases"));
        }
        let mut seen = HashSet::new();
        for case in &self.cases {
            if case.name.trim().is_empty() {
                bail!("{}", t!("config.empty_case_name"));
            }
            if !seen.insert(case.name.as_str()) {
                bail!("{}", t!("config.duplicate_case", name = case.name));
            }
        }
        Ok(())
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> u32 {
    2
}

/// Parses matrix text. Case directories are left as written.
pub fn parse_validation_matrix(content: &str) -> Result<ValidationMatrix> {
    let matrix: ValidationMatrix =
        toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())?;
    matrix.validate()?;
    Ok(matrix)
}

/// Loads the matrix at `path` and resolves every case directory against
/// the file's parent directory.
///
/// 加载 `path` 处的矩阵，并根据文件所在目录解析每个用例目录。
pub fn load_validation_matrix(path: &Path) -> Result<ValidationMatrix> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let mut matrix = parse_validation_matrix(&content)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for case in &mut matrix.cases {
        case.dir = infra_fs::resolve_path(base, &case.dir)?;
    }
    Ok(matrix)
}
