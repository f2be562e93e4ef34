//! # Commands / 命令
//!
//! - `run` - Executes the matrix / 执行矩阵
//! - `init` - Writes a starter matrix file / 写入初始矩阵文件

pub mod init;
pub mod run;
