//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a standalone HTML report: summary counters and one
//! row per case with its captured tool output folded underneath.
//!
//! 此模块生成独立的 HTML 报告：汇总计数，以及每个用例一行并附带可折叠的工具输出。

use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::core::models::TestResult;
use crate::infra::t;
use crate::reporting::console::Totals;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.25rem; }
.generated { color: #777; margin-top: 0; }
.totals span { display: inline-block; margin-right: 1.5rem; font-weight: 600; }
table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #ddd; vertical-align: top; }
pre { background: #f6f8fa; padding: 0.75rem; overflow-x: auto; white-space: pre-wrap; }
.status-passed { color: #1a7f37; }
.status-expected-failure { color: #9a6700; }
.status-failed { color: #cf222e; }
.status-skipped { color: #6e7781; }
"#;

/// Renders the report markup.
pub fn render_html_report(results: &[TestResult], locale: &str) -> Markup {
    let totals = Totals::from_results(results);
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                p.generated { (t!("html_report.generated_at", locale = locale, time = generated)) }
                div.totals {
                    span { (t!("html_report.total", locale = locale)) ": " (totals.total) }
                    span.status-passed { (t!("report.status_passed", locale = locale)) ": " (totals.passed) }
                    span.status-expected-failure {
                        (t!("report.status_expected_failure", locale = locale)) ": " (totals.expected_failures)
                    }
                    span.status-failed { (t!("report.status_failed", locale = locale)) ": " (totals.failed) }
                    span.status-skipped { (t!("report.status_skipped", locale = locale)) ": " (totals.skipped) }
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.col_status", locale = locale)) }
                            th { (t!("html_report.col_name", locale = locale)) }
                            th { (t!("html_report.col_dir", locale = locale)) }
                            th { (t!("html_report.col_duration", locale = locale)) }
                            th { (t!("html_report.col_attempts", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in results {
                            tr {
                                td class=(result.get_status_class()) { (result.get_status_str(locale)) }
                                td {
                                    (result.case_name())
                                    @if !result.get_output().is_empty() {
                                        details {
                                            summary { (t!("html_report.show_output", locale = locale)) }
                                            pre { (result.get_output()) }
                                        }
                                    }
                                }
                                td { (result.case().dir.display().to_string()) }
                                td {
                                    @match result.get_duration() {
                                        Some(d) => (format!("{:.2?}", d)),
                                        None => "N/A",
                                    }
                                }
                                td { (result.get_attempts()) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Writes the HTML report to `output_path`.
///
/// 从测试结果生成 HTML 报告并写入 `output_path`。
pub fn generate_html_report(results: &[TestResult], output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(results, locale);
    fs::write(output_path, markup.into_string())
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))
}
