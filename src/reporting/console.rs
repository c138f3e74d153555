//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the run summary and the details of unexpected
//! failures to the console, with color and internationalization support.
//!
//! 此模块在控制台打印运行摘要和意外失败的详细信息，支持彩色输出和国际化。

use colored::*;
use crate::core::models::{FailureReason, TestResult};
use crate::infra::t;

/// Counts per status, shared by every report format.
/// 各状态的计数，所有报告格式共用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub expected_failures: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut totals = Totals { total: results.len(), ..Default::default() };
        for result in results {
            match result {
                TestResult::Passed { .. } => totals.passed += 1,
                TestResult::ExpectedFailure { .. } => totals.expected_failures += 1,
                TestResult::Failed { .. } => totals.failed += 1,
                TestResult::Skipped { .. } => totals.skipped += 1,
            }
        }
        totals
    }
}

/// Prints a formatted summary of test results to the console.
///
/// 在控制台打印格式化的测试结果摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Validation Summary ---
///   - Passed             | ValidConfiguration                       |      1.23s
///   - Failed             | BrokenSyntax                             |      0.45s  (4 attempts)
///   - Skipped            | ValidWithDNS                             |        N/A
/// ```
pub fn print_summary(results: &[TestResult], locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    for result in results {
        let status_str = result.get_status_str(locale);
        let duration_str = result
            .get_duration()
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "N/A".to_string());

        // 每个步骤至少调用一次；超出部分来自重试。
        let attempts = result.get_attempts();
        let attempts_str = if attempts > 2 {
            format!(" ({} attempts)", attempts)
        } else {
            String::new()
        };

        let status_colored = match result {
            TestResult::Passed { .. } => status_str.green(),
            TestResult::ExpectedFailure { .. } => status_str.yellow(),
            TestResult::Failed { .. } => status_str.red(),
            TestResult::Skipped { .. } => status_str.dimmed(),
        };

        println!(
            "  - {:<18} | {:<40} | {:>10} {}",
            status_colored,
            result.case_name(),
            duration_str,
            attempts_str
        );
    }

    let totals = Totals::from_results(results);
    println!(
        "\n{}",
        t!(
            "report.totals",
            locale = locale,
            total = totals.total,
            passed = totals.passed + totals.expected_failures,
            failed = totals.failed,
            skipped = totals.skipped
        )
    );
}

/// Prints detailed information about unexpected failures.
/// Shows the tool's diagnostic output verbatim for each one.
///
/// 打印意外失败的详细信息，逐字显示工具的诊断输出。
pub fn print_unexpected_failure_details(unexpected_failures: &[&TestResult], locale: &str) {
    if unexpected_failures.is_empty() {
        return;
    }

    println!("\n{}", t!("report.unexpected_failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in unexpected_failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}' ({})",
            i + 1,
            unexpected_failures.len(),
            t!("report.header_failure", locale = locale).red(),
            result.case_name().cyan(),
            result.case().dir.display()
        );

        if let TestResult::Failed { output, reason, .. } = result {
            println!("\n--- {} ---\n", log_header(*reason, locale).yellow());
            println!("{}", output.trim_end());
            println!("\n{}", "-".repeat(80));
        }
    }
}

fn log_header(reason: FailureReason, locale: &str) -> String {
    let header = match reason {
        FailureReason::Setup | FailureReason::ToolUnavailable => t!("report.setup_log", locale = locale),
        FailureReason::Init => t!("report.init_log", locale = locale),
        FailureReason::Validate => t!("report.validate_log", locale = locale),
        FailureReason::UnexpectedSuccess => t!("report.unexpected_success_log", locale = locale),
        FailureReason::Internal => t!("report.internal_log", locale = locale),
    };
    header.to_string()
}
