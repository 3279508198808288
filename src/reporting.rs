//! # Reporting Module / 报告模块
//!
//! Rendering of analysis results, reference-data lookups and quality-control
//! runs, as HTML documents and as colored console output.
//!
//! 将分析结果、参考数据查询和质量控制运行渲染为 HTML 文档及彩色控制台输出。

pub mod console;
pub mod html;

// Re-export common reporting functions
pub use console::{print_analysis_summary, print_event, print_qc_summary};
pub use html::{escape_html, render_analysis, render_qc_page};
