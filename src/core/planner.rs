//! # Execution Planner Module / 执行计划模块
//!
//! This module turns a validation matrix into the list of cases this runner
//! will execute: filtering by name, splitting across CI runners, and building
//! fresh invocation options for each case that remains.
//!
//! 此模块将验证矩阵转换为本运行器要执行的用例列表：
//! 按名称过滤、在多个 CI 运行器之间拆分，并为保留的每个用例构造新的调用选项。

use crate::core::config::{TestCase, ValidationMatrix};
use crate::core::options::InvocationOptions;
use anyhow::{bail, Result};

/// A case paired with the options it will run with.
/// 与其运行选项配对的用例。
#[derive(Debug, Clone)]
pub struct PlannedCase {
    pub case: TestCase,
    pub options: InvocationOptions,
}

/// Represents a complete execution plan for a validation matrix.
/// 表示验证矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Cases to execute, in declaration order.
    /// 要执行的用例，保持声明顺序。
    pub cases_to_run: Vec<PlannedCase>,
    /// The number of cases dropped by the name filter.
    /// 被名称过滤器排除的用例数量。
    pub filtered_count: usize,
    /// Whether the cases are distributed across multiple runners (CI environment).
    /// 用例是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
}

/// Creates an execution plan for the given matrix.
///
/// # Arguments
/// * `matrix` - The complete validation matrix
/// * `filter` - Optional substring a case name must contain
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    matrix: &ValidationMatrix,
    filter: Option<&str>,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let (selected, filtered): (Vec<_>, Vec<_>) = matrix
        .cases
        .iter()
        .partition(|case| filter.is_none_or(|f| case.name.contains(f)));

    let (selected, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("Runner index must be less than total runners.");
            }
            let shard: Vec<_> = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, case)| case)
                .collect();
            (shard, true)
        }
        (None, None) => (selected, false),
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    let cases_to_run = selected
        .into_iter()
        .map(|case| PlannedCase {
            options: matrix.invocation_options(case),
            case: case.clone(),
        })
        .collect();

    Ok(ExecutionPlan {
        cases_to_run,
        filtered_count: filtered.len(),
        is_distributed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::parse_validation_matrix;

    fn matrix() -> ValidationMatrix {
        parse_validation_matrix(
            r#"
[[cases]]
name = "ValidConfiguration"
dir = "v0"

[[cases]]
name = "ValidWithDNS"
dir = "v0"

[[cases]]
name = "BrokenSyntax"
dir = "broken"
expect_success = false
"#,
        )
        .unwrap()
    }

    fn names(plan: &ExecutionPlan) -> Vec<&str> {
        plan.cases_to_run.iter().map(|p| p.case.name.as_str()).collect()
    }

    #[test]
    fn keeps_declaration_order() {
        let plan = plan_execution(&matrix(), None, None, None).unwrap();
        assert_eq!(names(&plan), ["ValidConfiguration", "ValidWithDNS", "BrokenSyntax"]);
        assert!(!plan.is_distributed);
    }

    #[test]
    fn filter_keeps_matching_names() {
        let plan = plan_execution(&matrix(), Some("Valid"), None, None).unwrap();
        assert_eq!(names(&plan), ["ValidConfiguration", "ValidWithDNS"]);
        assert_eq!(plan.filtered_count, 1);
    }

    #[test]
    fn shards_are_disjoint_and_complete() {
        let m = matrix();
        let first = plan_execution(&m, None, Some(2), Some(0)).unwrap();
        let second = plan_execution(&m, None, Some(2), Some(1)).unwrap();
        assert_eq!(names(&first), ["ValidConfiguration", "BrokenSyntax"]);
        assert_eq!(names(&second), ["ValidWithDNS"]);
        assert!(first.is_distributed);
    }

    #[test]
    fn inconsistent_runner_arguments_are_rejected() {
        let m = matrix();
        assert!(plan_execution(&m, None, Some(2), Some(2)).is_err());
        assert!(plan_execution(&m, None, Some(2), None).is_err());
        assert!(plan_execution(&m, None, Some(0), Some(0)).is_err());
    }

    #[test]
    fn each_case_gets_its_own_directory() {
        let plan = plan_execution(&matrix(), None, None, None).unwrap();
        let broken = &plan.cases_to_run[2];
        assert_eq!(broken.options.working_dir(), std::path::Path::new("broken"));
    }
}
