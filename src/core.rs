//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the validation runner:
//! invocation options, retry classification, the init/validate runner and
//! the parallel case executor.
//!
//! 此模块包含验证运行器的核心功能：
//! 调用选项、重试分类、init/validate 运行器以及并行用例执行器。

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod options;
pub mod planner;
pub mod retry;
pub mod runner;
pub mod state;

// Re-exports
pub use config::{TestCase, ValidationMatrix};
pub use error::ValidationError;
pub use execution::run_cases;
pub use models::TestResult;
pub use options::InvocationOptions;
pub use runner::ValidationRunner;
