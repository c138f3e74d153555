//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable report for CI systems.
//!
//! 供 CI 系统使用的机器可读报告。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::TestResult;
use crate::reporting::console::Totals;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub tool: &'a str,
    pub summary: Totals,
    pub results: &'a [TestResult],
}

impl<'a> JsonReport<'a> {
    pub fn new(tool: &'a str, results: &'a [TestResult]) -> Self {
        Self {
            generated_at: Utc::now(),
            tool,
            summary: Totals::from_results(results),
            results,
        }
    }
}

pub fn write_json_report(results: &[TestResult], tool: &str, output_path: &Path) -> Result<()> {
    let report = JsonReport::new(tool, results);
    let body = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
    fs::write(output_path, body)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))
}
