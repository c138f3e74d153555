//! # Validation Runner Module / 验证运行器模块
//!
//! Drives one working directory through `init` and then `validate`, retrying
//! failures the options classify as transient. See [`ValidationState`] for the
//! lifecycle a run follows.
//!
//! 驱动一个工作目录依次执行 `init` 和 `validate`，并对选项判定为瞬态的失败进行重试。
//! 运行所遵循的生命周期参见 [`ValidationState`]。

use tracing::{debug, warn};

use crate::core::error::ValidationError;
use crate::core::models::{Step, StepReport, ValidationOutcome};
use crate::core::options::InvocationOptions;
use crate::core::retry::ErrorClass;
use crate::core::state::ValidationState;
use crate::infra::command::{ProcessExecutor, ToolExecutor};
use crate::infra::fs;

#[derive(Debug, Clone, Default)]
pub struct ValidationRunner<E = ProcessExecutor> {
    executor: E,
}

impl ValidationRunner<ProcessExecutor> {
    /// A runner that spawns real processes.
    pub fn process() -> Self {
        Self::new(ProcessExecutor)
    }
}

impl<E: ToolExecutor> ValidationRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Initializes, then validates. Validation is never attempted when
    /// initialization fails.
    ///
    /// 先初始化，再验证。初始化失败时绝不会尝试验证。
    pub async fn init_and_validate(
        &self,
        options: &InvocationOptions,
    ) -> Result<ValidationOutcome, ValidationError> {
        let mut state = ValidationState::NotStarted;
        let mut steps = Vec::with_capacity(2);

        state = transition(state, ValidationState::Initializing)?;
        let init = self.init(options).await;
        state = settle(state, &init, ValidationState::Initialized)?;
        steps.push(init?);

        state = transition(state, ValidationState::Validating)?;
        let init_attempts: u32 = steps.iter().map(|s| s.attempts).sum();
        let validate = self
            .run_step(Step::Validate, options)
            .await
            .map_err(|e| e.after_earlier_attempts(init_attempts));
        state = settle(state, &validate, ValidationState::Validated)?;
        steps.push(validate?);

        Ok(ValidationOutcome {
            working_dir: options.working_dir().to_path_buf(),
            steps,
            final_state: state,
        })
    }

    /// Runs `init` after checking the working directory. Safe to repeat.
    pub async fn init(&self, options: &InvocationOptions) -> Result<StepReport, ValidationError> {
        check_working_dir(options)?;
        self.run_step(Step::Init, options).await
    }

    /// Runs `validate` on a directory that has already been initialized.
    pub async fn validate(&self, options: &InvocationOptions) -> Result<StepReport, ValidationError> {
        check_working_dir(options)?;
        self.run_step(Step::Validate, options).await
    }

    async fn run_step(
        &self,
        step: Step,
        options: &InvocationOptions,
    ) -> Result<StepReport, ValidationError> {
        let invocation = options.invocation(step)?;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(%step, attempt, command = %invocation, "invoking tool");

            let result = self.executor.execute(&invocation).await.map_err(|source| {
                ValidationError::ToolUnavailable {
                    binary: invocation.program().to_string(),
                    source,
                }
            })?;

            if result.success {
                return Ok(StepReport { step, attempts: attempt, output: result.output });
            }

            match options.retryable_errors().classify(&result.output) {
                ErrorClass::Transient { pattern, retries } if attempt <= retries => {
                    let delay = options.backoff().delay_for_retry(attempt);
                    warn!(
                        %step,
                        attempt,
                        retries,
                        pattern,
                        ?delay,
                        "transient tool error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                ErrorClass::Transient { pattern, retries } => {
                    warn!(%step, attempt, pattern, "transient tool error did not clear after {retries} retries");
                    return Err(tool_error(step, attempt, result));
                }
                ErrorClass::Fatal => return Err(tool_error(step, attempt, result)),
            }
        }
    }
}

fn tool_error(step: Step, attempts: u32, result: crate::infra::command::ToolOutput) -> ValidationError {
    ValidationError::Tool {
        step,
        attempts,
        earlier_attempts: 0,
        exit_code: result.exit_code,
        output: result.output,
    }
}

fn check_working_dir(options: &InvocationOptions) -> Result<(), ValidationError> {
    fs::ensure_readable_dir(options.working_dir()).map_err(|e| ValidationError::Setup {
        path: options.working_dir().to_path_buf(),
        reason: e.to_string(),
    })
}

fn transition(
    from: ValidationState,
    to: ValidationState,
) -> Result<ValidationState, ValidationError> {
    let next = from.advance(to)?;
    debug!(%from, %to, "validation state");
    Ok(next)
}

fn settle<T>(
    from: ValidationState,
    result: &Result<T, ValidationError>,
    on_success: ValidationState,
) -> Result<ValidationState, ValidationError> {
    let to = if result.is_ok() { on_success } else { ValidationState::Failed };
    transition(from, to)
}
