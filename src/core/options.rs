//! # Invocation Options Module / 调用选项模块
//!
//! [`InvocationOptions`] describes how to run the tool against one working
//! directory. It is assembled once per test case and never changes afterwards.
//! Construction never fails; a bad directory is reported when the runner
//! starts initializing.
//!
//! [`InvocationOptions`] 描述如何针对一个工作目录运行工具。
//! 它在每个测试用例中组装一次，之后不再改变。构造过程永不失败；
//! 无效目录会在运行器开始初始化时报告。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::ValidationError;
use crate::core::models::Step;
use crate::core::retry::{BackoffPolicy, RetryableError, RetryableErrors};
use crate::infra::command::ToolInvocation;

/// Default tool binary.
pub const DEFAULT_TOOL: &str = "terraform";

/// Environment applied to every invocation so the tool never waits on a prompt.
pub const AUTOMATION_ENV: &[(&str, &str)] = &[("TF_IN_AUTOMATION", "1"), ("TF_INPUT", "0")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOptions {
    working_dir: PathBuf,
    no_color: bool,
    retryable_errors: RetryableErrors,
    backoff: BackoffPolicy,
    tool_binary: String,
    env_vars: BTreeMap<String, String>,
}

impl InvocationOptions {
    /// Starts a builder with no retryable errors and the default backoff.
    pub fn builder(working_dir: impl Into<PathBuf>) -> InvocationOptionsBuilder {
        InvocationOptionsBuilder::new(working_dir.into())
    }

    /// Options for `working_dir` with the built-in retryable-error table.
    /// 使用内置可重试错误表为 `working_dir` 构造选项。
    pub fn with_default_retryable_errors(working_dir: impl Into<PathBuf>, no_color: bool) -> Self {
        Self::builder(working_dir)
            .no_color(no_color)
            .default_retryable_errors()
            .build()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn no_color(&self) -> bool {
        self.no_color
    }

    pub fn retryable_errors(&self) -> &RetryableErrors {
        &self.retryable_errors
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    pub fn tool_binary(&self) -> &str {
        &self.tool_binary
    }

    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env_vars
    }

    /// Arguments passed to the tool for `step`.
    ///
    /// `validate` gets no `-var`/`-var-file` flags: it checks the
    /// configuration independently of variable values.
    pub fn step_args(&self, step: Step) -> Vec<String> {
        let mut args = vec![step.as_str().to_string()];
        if step == Step::Init {
            args.push("-input=false".to_string());
        }
        if self.no_color {
            args.push("-no-color".to_string());
        }
        args
    }

    /// Resolves the full command line for `step`.
    ///
    /// `tool_binary` may carry leading arguments (`"docker run --rm hashicorp/terraform"`);
    /// it is split with shell quoting rules.
    pub fn invocation(&self, step: Step) -> Result<ToolInvocation, ValidationError> {
        let words = shlex::split(&self.tool_binary).filter(|w| !w.is_empty());
        let Some(mut words) = words else {
            return Err(ValidationError::ToolUnavailable {
                binary: self.tool_binary.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "tool command is empty or has unbalanced quotes",
                ),
            });
        };
        let program = words.remove(0);
        words.extend(self.step_args(step));

        let mut env: BTreeMap<String, String> = AUTOMATION_ENV
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env.extend(self.env_vars.clone());

        Ok(ToolInvocation {
            program,
            args: words,
            working_dir: self.working_dir.clone(),
            env,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InvocationOptionsBuilder {
    working_dir: PathBuf,
    no_color: bool,
    retryable_errors: RetryableErrors,
    backoff: BackoffPolicy,
    tool_binary: String,
    env_vars: BTreeMap<String, String>,
}

impl InvocationOptionsBuilder {
    fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            no_color: false,
            retryable_errors: RetryableErrors::new(),
            backoff: BackoffPolicy::default(),
            tool_binary: DEFAULT_TOOL.to_string(),
            env_vars: BTreeMap::new(),
        }
    }

    pub fn no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Adds the built-in table. Patterns already present keep their position.
    pub fn default_retryable_errors(mut self) -> Self {
        self.retryable_errors.extend(RetryableErrors::defaults().iter().cloned());
        self
    }

    pub fn retryable_error(mut self, pattern: impl Into<String>, retries: u32) -> Self {
        self.retryable_errors.insert(pattern, retries);
        self
    }

    pub fn retryable_errors<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = RetryableError>,
    {
        self.retryable_errors.extend(entries);
        self
    }

    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn tool_binary(mut self, tool_binary: impl Into<String>) -> Self {
        self.tool_binary = tool_binary.into();
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> InvocationOptions {
        InvocationOptions {
            working_dir: self.working_dir,
            no_color: self.no_color,
            retryable_errors: self.retryable_errors,
            backoff: self.backoff,
            tool_binary: self.tool_binary,
            env_vars: self.env_vars,
        }
    }
}
