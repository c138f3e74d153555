//! # Case Execution Module / 用例执行模块
//!
//! Runs every planned case as its own tokio task. A semaphore bounds how many
//! run at once; each task reports over an mpsc channel, and the collector puts
//! results back into declaration order. Cases share nothing but the runner.
//!
//! 将每个计划用例作为独立的 tokio 任务运行。信号量限制同时运行的数量；
//! 每个任务通过 mpsc 通道报告结果，收集器按声明顺序重新排列结果。
//! 用例之间除运行器外不共享任何状态。

use colored::*;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::core::config::TestCase;
use crate::core::models::{FailureReason, TestResult};
use crate::core::planner::PlannedCase;
use crate::core::runner::ValidationRunner;
use crate::infra::command::ToolExecutor;
use crate::infra::t;

/// Runs all `cases` with at most `jobs` in flight.
///
/// Once `cancel` fires, cases that have not finished are reported as
/// [`TestResult::Skipped`] and their tool processes are killed.
///
/// # Returns
/// One result per case, in the order the cases were given.
pub async fn run_cases<E>(
    cases: Vec<PlannedCase>,
    jobs: usize,
    runner: Arc<ValidationRunner<E>>,
    cancel: CancellationToken,
) -> Vec<TestResult>
where
    E: ToolExecutor + 'static,
{
    let declared: Vec<TestCase> = cases.iter().map(|p| p.case.clone()).collect();
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let (tx, rx) = mpsc::channel::<(usize, TestResult)>(declared.len().max(1));

    let handles: Vec<_> = cases
        .into_iter()
        .enumerate()
        .map(|(index, planned)| {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let runner = Arc::clone(&runner);
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => TestResult::Skipped { case: planned.case.clone() },
                    result = run_planned_case(&runner, &semaphore, &planned) => result,
                };
                // The collector only stops once every sender is gone.
                let _ = tx.send((index, result)).await;
            })
        })
        .collect();
    drop(tx);

    let mut slots: Vec<Option<TestResult>> = declared.iter().map(|_| None).collect();
    let mut results = ReceiverStream::new(rx);
    while let Some((index, result)) = results.next().await {
        slots[index] = Some(result);
    }

    for joined in join_all(handles).await {
        if let Err(e) = joined {
            error!("validation task aborted: {e}");
        }
    }

    slots
        .into_iter()
        .zip(declared)
        .map(|(slot, case)| {
            slot.unwrap_or_else(|| TestResult::Failed {
                case,
                output: t!("run.task_aborted").to_string(),
                reason: FailureReason::Internal,
                duration: Duration::ZERO,
                attempts: 0,
            })
        })
        .collect()
}

/// Runs one case once a concurrency slot is free.
async fn run_planned_case<E: ToolExecutor>(
    runner: &ValidationRunner<E>,
    semaphore: &Semaphore,
    planned: &PlannedCase,
) -> TestResult {
    let case = planned.case.clone();
    let Ok(_permit) = semaphore.acquire().await else {
        return TestResult::Skipped { case };
    };

    println!("{}", t!("run.validating_case", name = case.name, dir = case.dir.display()).blue());

    let start = Instant::now();
    let outcome = runner.init_and_validate(&planned.options).await;
    let result = TestResult::from_validation(case, outcome, start.elapsed());

    let seconds = format!("{:.2}", start.elapsed().as_secs_f64());
    let name = result.case_name();
    match &result {
        TestResult::Passed { .. } => {
            println!("{}", t!("run.case_passed", name = name, duration = seconds).green())
        }
        TestResult::ExpectedFailure { .. } => {
            println!("{}", t!("run.case_failed_as_expected", name = name, duration = seconds).yellow())
        }
        _ => println!("{}", t!("run.case_failed", name = name, duration = seconds).red()),
    }

    result
}
