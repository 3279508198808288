//! # Core Module / 核心模块
//!
//! Domain logic of tarif-desk: data models, configuration, reference data
//! accessors, backend wire types, rule-hint classification and the
//! sequential example test runner.
//!
//! tarif-desk 的领域逻辑：数据模型、配置、参考数据访问、后端传输类型、
//! 规则提示分类以及顺序示例测试运行器。

pub mod billing;
pub mod config;
pub mod hints;
pub mod lenient;
pub mod models;
pub mod reference;
pub mod runner;

// Re-exports
pub use config::AppConfig;
pub use reference::ReferenceData;
pub use runner::{ExampleTester, TestRunner};
