//! # Commands / 子命令
//!
//! - `run` - validate every case in a matrix file / 验证矩阵文件中的每个用例
//! - `init` - write a starter matrix file / 生成初始矩阵文件

pub mod init;
pub mod run;
