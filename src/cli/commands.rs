//! # Commands Module / 命令模块
//!
//! One module per subcommand. Each `execute` returns the process exit code;
//! user-facing failures (empty input, unknown code, failed backend call) are
//! reported on the console and mapped to `ExitCode::FAILURE` rather than
//! propagated as errors.
//!
//! 每个子命令一个模块。面向用户的失败在控制台报告并映射为失败退出码。

pub mod analyze;
pub mod feedback;
pub mod init;
pub mod lookup;
pub mod prefs;
pub mod qc;
