//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures passed between the runner, the
//! case executor and the reporters: the tool steps, the transcript of a
//! successful run, and the final per-case test result.
//!
//! 此模块定义了在运行器、用例执行器和报告器之间传递的数据结构：
//! 工具步骤、成功运行的记录以及每个用例的最终测试结果。

use crate::core::config::TestCase;
use crate::core::error::ValidationError;
use crate::core::state::ValidationState;
use crate::infra::t;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// One invocation of the external tool.
/// 外部工具的一次调用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Prepares the working directory (providers, modules, lock file).
    /// 准备工作目录（provider、模块、锁文件）。
    Init,
    /// Checks syntax and internal consistency. Never takes variables.
    /// 检查语法和内部一致性，从不接受变量。
    Validate,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Init => "init",
            Step::Validate => "validate",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful step left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: Step,
    /// Invocations made, including the one that succeeded.
    pub attempts: u32,
    pub output: String,
}

/// The transcript of a run that reached `Validated`.
/// 到达 `Validated` 状态的运行记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub working_dir: PathBuf,
    pub steps: Vec<StepReport>,
    pub final_state: ValidationState,
}

impl ValidationOutcome {
    pub fn attempts(&self) -> u32 {
        self.steps.iter().map(|s| s.attempts).sum()
    }

    /// Output of every step, in order.
    pub fn combined_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("$ {}\n{}", s.step, s.output.trim_end()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Enumerates the possible reasons for a test case failure.
/// 枚举测试用例失败的可能原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The working directory was missing or unreadable.
    /// 工作目录缺失或不可读。
    Setup,
    /// The tool binary could not be launched.
    /// 无法启动工具二进制文件。
    ToolUnavailable,
    /// `init` failed.
    Init,
    /// `validate` failed.
    Validate,
    /// The case expected a failure but validation succeeded.
    /// 用例预期失败，但验证成功了。
    UnexpectedSuccess,
    /// The case never produced a verdict (its task aborted).
    /// 用例未产生结论（其任务被中止）。
    Internal,
}

/// Represents the final result of a single test case.
/// 表示单个测试用例的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestResult {
    /// Validation succeeded and the case expected it to.
    /// 验证成功且符合用例预期。
    Passed {
        case: TestCase,
        output: String,
        duration: Duration,
        attempts: u32,
    },
    /// Validation failed with a tool error and the case expected it to.
    /// 验证因工具错误失败，且符合用例预期。
    ExpectedFailure {
        case: TestCase,
        output: String,
        reason: FailureReason,
        duration: Duration,
        attempts: u32,
    },
    /// The outcome contradicted the case's expectation.
    /// 结果与用例预期不符。
    Failed {
        case: TestCase,
        output: String,
        reason: FailureReason,
        duration: Duration,
        attempts: u32,
    },
    /// The run was interrupted before this case finished.
    /// 运行在此用例完成前被中断。
    Skipped { case: TestCase },
}

impl TestResult {
    /// Maps the runner's verdict onto the case's expectation.
    ///
    /// Setup failures never satisfy `expect_success = false`: a case that
    /// expects a broken configuration still needs a directory to validate.
    pub fn from_validation(
        case: TestCase,
        result: Result<ValidationOutcome, ValidationError>,
        duration: Duration,
    ) -> Self {
        match result {
            Ok(outcome) if case.expect_success => TestResult::Passed {
                output: outcome.combined_output(),
                attempts: outcome.attempts(),
                case,
                duration,
            },
            Ok(outcome) => TestResult::Failed {
                output: outcome.combined_output(),
                attempts: outcome.attempts(),
                reason: FailureReason::UnexpectedSuccess,
                case,
                duration,
            },
            Err(err) if !case.expect_success && !err.is_setup() => TestResult::ExpectedFailure {
                output: err.to_string(),
                reason: err.failure_reason(),
                attempts: err.attempts(),
                case,
                duration,
            },
            Err(err) => TestResult::Failed {
                output: err.to_string(),
                reason: err.failure_reason(),
                attempts: err.attempts(),
                case,
                duration,
            },
        }
    }

    pub fn case(&self) -> &TestCase {
        match self {
            TestResult::Passed { case, .. }
            | TestResult::ExpectedFailure { case, .. }
            | TestResult::Failed { case, .. }
            | TestResult::Skipped { case } => case,
        }
    }

    pub fn case_name(&self) -> &str {
        &self.case().name
    }

    /// Whether the case met its expectation.
    pub fn is_success(&self) -> bool {
        matches!(self, TestResult::Passed { .. } | TestResult::ExpectedFailure { .. })
    }

    /// Checks if a test result is a failure that decides the exit code.
    pub fn is_unexpected_failure(&self) -> bool {
        matches!(self, TestResult::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestResult::Skipped { .. })
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            TestResult::ExpectedFailure { reason, .. } | TestResult::Failed { reason, .. } => {
                Some(*reason)
            }
            _ => None,
        }
    }

    /// Gets the status of the test result as a string for display.
    /// 以字符串形式获取测试结果的状态以供显示。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self {
            TestResult::Passed { .. } => t!("report.status_passed", locale = locale).to_string(),
            TestResult::ExpectedFailure { .. } => {
                t!("report.status_expected_failure", locale = locale).to_string()
            }
            TestResult::Failed { reason, .. } => match reason {
                FailureReason::Setup | FailureReason::ToolUnavailable => {
                    t!("report.status_setup_error", locale = locale).to_string()
                }
                FailureReason::UnexpectedSuccess => {
                    t!("report.status_unexpected_success", locale = locale).to_string()
                }
                _ => t!("report.status_failed", locale = locale).to_string(),
            },
            TestResult::Skipped { .. } => t!("report.status_skipped", locale = locale).to_string(),
        }
    }

    /// Gets the appropriate CSS class for the test status.
    pub fn get_status_class(&self) -> &'static str {
        match self {
            TestResult::Passed { .. } => "status-passed",
            TestResult::ExpectedFailure { .. } => "status-expected-failure",
            TestResult::Failed { .. } => "status-failed",
            TestResult::Skipped { .. } => "status-skipped",
        }
    }

    pub fn get_output(&self) -> &str {
        match self {
            TestResult::Passed { output, .. }
            | TestResult::ExpectedFailure { output, .. }
            | TestResult::Failed { output, .. } => output,
            TestResult::Skipped { .. } => "",
        }
    }

    pub fn get_duration(&self) -> Option<Duration> {
        match self {
            TestResult::Passed { duration, .. }
            | TestResult::ExpectedFailure { duration, .. }
            | TestResult::Failed { duration, .. } => Some(*duration),
            TestResult::Skipped { .. } => None,
        }
    }

    /// Tool invocations made for this case across both steps.
    pub fn get_attempts(&self) -> u32 {
        match self {
            TestResult::Passed { attempts, .. }
            | TestResult::ExpectedFailure { attempts, .. }
            | TestResult::Failed { attempts, .. } => *attempts,
            TestResult::Skipped { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(expect_success: bool) -> TestCase {
        TestCase {
            name: "case".into(),
            dir: PathBuf::from("cfg"),
            expect_success,
        }
    }

    fn outcome() -> ValidationOutcome {
        ValidationOutcome {
            working_dir: PathBuf::from("cfg"),
            steps: vec![
                StepReport { step: Step::Init, attempts: 2, output: "ok\n".into() },
                StepReport { step: Step::Validate, attempts: 1, output: "Success!\n".into() },
            ],
            final_state: ValidationState::Validated,
        }
    }

    fn tool_error() -> ValidationError {
        ValidationError::Tool {
            step: Step::Validate,
            attempts: 1,
            earlier_attempts: 2,
            exit_code: Some(1),
            output: "Error: Missing required argument".into(),
        }
    }

    #[test]
    fn success_when_expected_passes() {
        let result = TestResult::from_validation(case(true), Ok(outcome()), Duration::ZERO);
        assert!(matches!(result, TestResult::Passed { attempts: 3, .. }));
        assert!(result.get_output().contains("$ validate\nSuccess!"));
    }

    #[test]
    fn success_when_failure_expected_is_unexpected() {
        let result = TestResult::from_validation(case(false), Ok(outcome()), Duration::ZERO);
        assert_eq!(result.reason(), Some(FailureReason::UnexpectedSuccess));
        assert!(result.is_unexpected_failure());
    }

    #[test]
    fn tool_error_when_failure_expected_is_success() {
        let result = TestResult::from_validation(case(false), Err(tool_error()), Duration::ZERO);
        assert!(matches!(result, TestResult::ExpectedFailure { reason: FailureReason::Validate, .. }));
        // Counted like a pass: init's two attempts plus validate's one.
        assert_eq!(result.get_attempts(), 3);
        assert!(result.is_success());
    }

    #[test]
    fn setup_error_always_fails() {
        let err = ValidationError::Setup { path: "missing".into(), reason: "not found".into() };
        let result = TestResult::from_validation(case(false), Err(err), Duration::ZERO);
        assert_eq!(result.reason(), Some(FailureReason::Setup));
        assert!(result.get_output().contains("missing"));
    }
}
