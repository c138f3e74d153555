//! # Validation Runner Library / Validation Runner 库
//!
//! This library provides a configuration-validation harness: it runs an
//! infrastructure-as-code tool's `init` and `validate` steps against one or
//! more configuration directories, retries transient tool errors with
//! exponential backoff, and reports each directory as pass or fail.
//!
//! 此库提供一个配置验证工具：针对一个或多个配置目录运行基础设施即代码工具的
//! `init` 和 `validate` 步骤，以指数退避重试瞬态工具错误，并将每个目录报告为通过或失败。
//!
//! ## Modules / 模块
//!
//! - `core` - Invocation options, retry classification, the runner and the case executor
//! - `infra` - Process execution, file system checks, logging
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 调用选项、重试分类、运行器和用例执行器
//! - `infra` - 进程执行、文件系统检查、日志
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令
//!
//! ## Example / 示例
//!
//! ```no_run
//! use validation_runner::{InvocationOptions, ValidationRunner};
//!
//! # async fn demo() -> Result<(), validation_runner::ValidationError> {
//! let options = InvocationOptions::with_default_retryable_errors("../v0", true);
//! let outcome = ValidationRunner::process().init_and_validate(&options).await?;
//! println!("{}", outcome.combined_output());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;
pub use crate::core::{InvocationOptions, TestResult, ValidationError, ValidationRunner};

/// Detects the system locale and maps it onto an available translation.
///
/// Tries the full locale first (e.g., "zh-CN"), then the language part only
/// (e.g., "en" from "en-US"), and finally falls back to "en".
pub fn detect_locale() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.iter().any(|l| *l == locale) {
        return locale;
    }
    locale
        .split('-')
        .next()
        .filter(|lang_code| available_locales.iter().any(|l| l == lang_code))
        .unwrap_or("en")
        .to_string()
}

/// Sets the process-wide output language from the system locale.
pub fn init() {
    rust_i18n::set_locale(&detect_locale());
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
