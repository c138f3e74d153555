//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the validation runner,
//! including process execution, file system checks, logging and i18n support.
//!
//! 此模块为验证运行器提供基础设施服务，
//! 包括进程执行、文件系统检查、日志和国际化支持。

pub mod command;
pub mod fs;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
