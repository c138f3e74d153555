//! # Validation State Module / 验证状态模块
//!
//! The lifecycle a single validation run moves through:
//! `NotStarted → Initializing → Initialized → Validating → {Validated | Failed}`.
//! `Initializing` may also fall straight to `Failed`. Nothing skips `Initialized`.
//!
//! 单次验证运行所经历的生命周期。`Initializing` 也可以直接进入 `Failed`，
//! 任何转换都不能跳过 `Initialized`。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationState {
    NotStarted,
    Initializing,
    Initialized,
    Validating,
    Validated,
    Failed,
}

/// Returned when a transition is not part of the lifecycle.
/// 当转换不属于生命周期时返回。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal validation state transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: ValidationState,
    pub to: ValidationState,
}

impl ValidationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ValidationState::Validated | ValidationState::Failed)
    }

    /// Whether `next` directly follows `self`.
    ///
    /// `Initialized → Initializing` is allowed so that a directory can be
    /// initialized again before validating.
    pub fn can_advance_to(self, next: ValidationState) -> bool {
        use ValidationState::*;
        matches!(
            (self, next),
            (NotStarted, Initializing)
                | (Initializing, Initialized)
                | (Initializing, Failed)
                | (Initialized, Initializing)
                | (Initialized, Validating)
                | (Validating, Validated)
                | (Validating, Failed)
        )
    }

    pub fn advance(self, next: ValidationState) -> Result<ValidationState, IllegalTransition> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(IllegalTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationState::NotStarted => "not-started",
            ValidationState::Initializing => "initializing",
            ValidationState::Initialized => "initialized",
            ValidationState::Validating => "validating",
            ValidationState::Validated => "validated",
            ValidationState::Failed => "failed",
        };
        f.write_str(name)
    }
}
