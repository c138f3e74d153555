//! # Validation Errors / 验证错误
//!
//! Typed failures of a validation run. Every variant reaches the test case
//! boundary; none is swallowed by the runner.
//!
//! 验证运行的类型化失败。每个变体都会传递到测试用例边界，运行器不会吞掉任何错误。

use std::path::PathBuf;

use crate::core::models::{FailureReason, Step};
use crate::core::state::IllegalTransition;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The working directory is missing, unreadable, or not a directory.
    /// Raised before the tool is ever launched and never retried.
    #[error("working directory `{}` is not usable: {reason}", .path.display())]
    Setup { path: PathBuf, reason: String },

    /// The tool binary could not be launched at all.
    #[error("could not launch `{binary}`: {source}")]
    ToolUnavailable {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and reported a failure that is not transient, or a
    /// transient failure that outlived its retries.
    #[error("`{step}` failed after {attempts} attempt(s) ({}):\n{output}", exit_label(.exit_code))]
    Tool {
        step: Step,
        /// Invocations of `step` itself.
        attempts: u32,
        /// Invocations spent on steps that succeeded before `step`.
        earlier_attempts: u32,
        exit_code: Option<i32>,
        output: String,
    },

    #[error(transparent)]
    State(#[from] IllegalTransition),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl ValidationError {
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            ValidationError::Setup { .. } => FailureReason::Setup,
            ValidationError::ToolUnavailable { .. } => FailureReason::ToolUnavailable,
            ValidationError::Tool { step: Step::Init, .. } => FailureReason::Init,
            ValidationError::Tool { step: Step::Validate, .. } => FailureReason::Validate,
            ValidationError::State(_) => FailureReason::Internal,
        }
    }

    /// Errors raised before the tool produced a verdict on the configuration.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            ValidationError::Setup { .. } | ValidationError::ToolUnavailable { .. }
        )
    }

    /// Tool invocations made across both steps before giving up. Zero when
    /// the tool never ran.
    pub fn attempts(&self) -> u32 {
        match self {
            ValidationError::Tool { attempts, earlier_attempts, .. } => attempts + earlier_attempts,
            _ => 0,
        }
    }

    /// Records invocations already spent on earlier steps.
    pub(crate) fn after_earlier_attempts(self, spent: u32) -> Self {
        match self {
            ValidationError::Tool { step, attempts, earlier_attempts, exit_code, output } => {
                ValidationError::Tool {
                    step,
                    attempts,
                    earlier_attempts: earlier_attempts + spent,
                    exit_code,
                    output,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_mentions_the_path() {
        let err = ValidationError::Setup {
            path: PathBuf::from("does/not/exist"),
            reason: "No such file or directory".into(),
        };
        let message = err.to_string();
        assert!(message.contains("does/not/exist"));
        assert!(err.is_setup());
        assert_eq!(err.failure_reason(), FailureReason::Setup);
    }

    #[test]
    fn tool_error_surfaces_output_verbatim() {
        let err = ValidationError::Tool {
            step: Step::Validate,
            attempts: 1,
            earlier_attempts: 0,
            exit_code: Some(1),
            output: "Error: Unsupported block type".into(),
        };
        let message = err.to_string();
        assert!(message.contains("`validate` failed after 1 attempt(s) (exit code 1)"));
        assert!(message.ends_with("Error: Unsupported block type"));
        assert_eq!(err.failure_reason(), FailureReason::Validate);
        assert!(!err.is_setup());
    }

    #[test]
    fn attempts_include_earlier_steps() {
        let err = ValidationError::Tool {
            step: Step::Validate,
            attempts: 2,
            earlier_attempts: 0,
            exit_code: Some(1),
            output: String::new(),
        }
        .after_earlier_attempts(3);
        assert_eq!(err.attempts(), 5);
        assert!(err.to_string().contains("failed after 2 attempt(s)"));
    }
}
