//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a starter
//! validation matrix, either from a template or from an interactive wizard.
//!
//! 此模块实现 `init` 命令，通过模板或交互式向导生成初始验证矩阵。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input};
use std::{fs, path::PathBuf};

use crate::core::config::{BackoffConfig, TestCase, ValidationMatrix};
use crate::core::options::DEFAULT_TOOL;
use crate::infra::t;

pub const DEFAULT_CONFIG: &str = r#"# Validation Matrix Configuration / 验证矩阵配置

# Language for runner output / 输出消息的语言
language = "en"

# Tool command, may carry leading arguments / 工具命令，可带前置参数
tool = "terraform"

# Pass -no-color to init and validate / 向 init 和 validate 传递 -no-color
no_color = true

# Retry the built-in transient errors (registry, network, state lock)
# 重试内置的瞬态错误（注册表、网络、状态锁）
default_retryable_errors = true

# Exponential backoff between retries / 重试之间的指数退避
[backoff]
initial_delay_ms = 1000
max_delay_ms = 30000
multiplier = 2

# Extra retryable patterns (substring match) / 额外的可重试模式（子串匹配）
[[retryable_errors]]
pattern = "Error acquiring the state lock"
retries = 5

# Cases: `dir` is relative to this file / 用例：`dir` 相对于本文件
[[cases]]
name = "ValidConfiguration"
dir = "../v0"
expect_success = true

[[cases]]
name = "ValidWithDNS"
dir = "../v0"
expect_success = true
"#;

/// Executes the init command with the provided arguments.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
/// * `non_interactive` - Write the template instead of asking questions
/// * `locale` - Language for prompts and messages
pub fn execute(output: PathBuf, force: bool, non_interactive: bool, locale: &str) -> Result<()> {
    if output.exists() && !force {
        println!("{}", t!("init.file_exists", locale = locale, path = output.display()).red());
        println!("{}", t!("init.use_force", locale = locale).yellow());
        return Ok(());
    }

    let content = if non_interactive {
        DEFAULT_CONFIG.to_string()
    } else {
        let matrix = run_wizard(locale)?;
        toml::to_string(&matrix).context(t!("init.serialize_failed", locale = locale).to_string())?
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", locale = locale, path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(&output, content)
        .with_context(|| t!("init.write_failed", locale = locale, path = output.display()).to_string())?;

    println!("{}", t!("init.success", locale = locale, path = output.display()).green());
    println!("{}", t!("init.next_steps", locale = locale));
    Ok(())
}

/// Asks for the tool and one or more cases.
fn run_wizard(locale: &str) -> Result<ValidationMatrix> {
    let tool: String = Input::new()
        .with_prompt(t!("init.prompt_tool", locale = locale).to_string())
        .default(DEFAULT_TOOL.to_string())
        .interact_text()?;

    let mut cases = Vec::new();
    loop {
        let name: String = Input::new()
            .with_prompt(t!("init.prompt_case_name", locale = locale).to_string())
            .interact_text()?;
        let dir: String = Input::new()
            .with_prompt(t!("init.prompt_case_dir", locale = locale).to_string())
            .default(".".to_string())
            .interact_text()?;
        let expect_success = Confirm::new()
            .with_prompt(t!("init.prompt_expect_success", locale = locale).to_string())
            .default(true)
            .interact()?;
        cases.push(TestCase { name, dir: PathBuf::from(dir), expect_success });

        let more = Confirm::new()
            .with_prompt(t!("init.prompt_add_another", locale = locale).to_string())
            .default(false)
            .interact()?;
        if !more {
            break;
        }
    }

    let matrix = ValidationMatrix {
        language: locale.to_string(),
        tool,
        no_color: true,
        default_retryable_errors: true,
        retryable_errors: Vec::new(),
        backoff: BackoffConfig::default(),
        cases,
    };
    matrix.validate()?;
    Ok(matrix)
}
