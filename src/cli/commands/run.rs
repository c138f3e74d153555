//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which validates every case of
//! a matrix file in parallel and turns the results into reports and an exit
//! code.
//!
//! 此模块实现 `run` 命令：并行验证矩阵文件中的每个用例，并将结果转换为报告和退出码。

use anyhow::{Context, Result};
use colored::*;
use std::{path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    core::{
        config::{self, ValidationMatrix},
        execution::run_cases,
        planner,
        runner::ValidationRunner,
    },
    infra::{fs, t},
    reporting::{
        console::{print_summary, print_unexpected_failure_details},
        html::generate_html_report,
        json::write_json_report,
    },
};

/// Arguments of the `run` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub config: PathBuf,
    pub jobs: Option<usize>,
    /// Replaces the matrix's `tool` setting.
    pub tool: Option<String>,
    pub filter: Option<String>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Wins over the matrix's `language` setting.
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `Ok` only when every case met its expectation and the run was not interrupted.
pub async fn execute(args: RunArgs) -> Result<()> {
    let (mut matrix, config_path) = setup_and_parse_config(&args.config)?;
    if let Some(tool) = &args.tool {
        matrix.tool = tool.clone();
    }
    let locale = args.lang.clone().unwrap_or_else(|| matrix.language.clone());
    rust_i18n::set_locale(&locale);

    println!(
        "{}",
        t!("run.loading_matrix", locale = locale, path = config_path.display())
    );
    println!("{}", t!("run.using_tool", locale = locale, tool = matrix.tool.yellow()));

    let plan = planner::plan_execution(
        &matrix,
        args.filter.as_deref(),
        args.total_runners,
        args.runner_index,
    )?;

    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered_cases",
                locale = locale,
                filtered = plan.filtered_count,
                total = plan.cases_to_run.len()
            )
            .cyan()
        );
    }

    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "run.running_as_split_runner",
                locale = locale,
                index = index + 1,
                total = total,
                count = plan.cases_to_run.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("run.running_as_single_runner", locale = locale).bold());
    }

    if plan.cases_to_run.is_empty() {
        println!("{}", t!("run.no_cases_to_run", locale = locale).green());
        return Ok(());
    }

    let stop_token = setup_signal_handler(&locale);
    let jobs = args.jobs.unwrap_or_else(|| num_cpus::get() / 2 + 1);
    let runner = Arc::new(ValidationRunner::process());
    let results = run_cases(plan.cases_to_run, jobs, runner, stop_token.clone()).await;

    print_summary(&results, &locale);

    if let Some(report_path) = &args.html {
        println!("\n{}", t!("run.writing_html", locale = locale, path = report_path.display()));
        if let Err(e) = generate_html_report(&results, report_path, &locale) {
            eprintln!("{} {:#}", t!("run.report_failed", locale = locale).red(), e);
        }
    }
    if let Some(report_path) = &args.json {
        println!("{}", t!("run.writing_json", locale = locale, path = report_path.display()));
        if let Err(e) = write_json_report(&results, &matrix.tool, report_path) {
            eprintln!("{} {:#}", t!("run.report_failed", locale = locale).red(), e);
        }
    }

    let unexpected_failures: Vec<_> = results.iter().filter(|r| r.is_unexpected_failure()).collect();
    if !unexpected_failures.is_empty() {
        print_unexpected_failure_details(&unexpected_failures, &locale);
        anyhow::bail!(
            "{}",
            t!("run.matrix_failed", locale = locale, count = unexpected_failures.len())
        );
    }
    if stop_token.is_cancelled() {
        anyhow::bail!("{}", t!("run.interrupted", locale = locale));
    }

    println!("\n{}", t!("run.all_cases_passed", locale = locale).green().bold());
    Ok(())
}

/// Sets up and parses the matrix configuration file.
fn setup_and_parse_config(config_path_arg: &PathBuf) -> Result<(ValidationMatrix, PathBuf)> {
    let config_path = fs::absolute_path(config_path_arg)
        .with_context(|| t!("config.read_failed", path = config_path_arg.display()).to_string())?;
    let matrix = config::load_validation_matrix(&config_path)?;
    Ok((matrix, config_path))
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
                token_clone.cancel();
            }
            Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
        }
    });

    token
}
