//! SQL 文件切分与查询执行胶水层（核心库）
//!
//! 设计要点：
//! - 切分器是唯一做词法分析的部分：单遍扫描，注释与字符串内的 `;` 不作为语句结束。
//! - 查询执行与文本生成通过 trait 注入，本库不内置任何网络客户端。
//! - 批量切分按输入顺序稳定输出，与线程数无关。

mod batch;
mod collab;
mod config;
mod error;
mod export;
mod options;
mod runner;
mod source;
mod splitter;
mod summary;
mod types;

pub use batch::{collect_sql_files, split_and_write, split_file, FileSplit};
pub use collab::{QueryExecutor, QueryOutcome, RowSet, TextGenerator};
pub use config::{load_config_file, ConfigFile, Overrides, Settings, API_KEY_ENV, DEFAULT_MODEL, PROJECT_ENV};
pub use error::{Result, SqlrunError};
pub use export::{export_rows, write_csv, write_json, ExportFormat};
pub use options::{OutputFormat, SplitOptions, SplitStats};
pub use runner::{estimate_cost_usd, format_bytes, QueryRunner, RunOptions, RunReport, COST_PER_TIB_USD};
pub use source::SqlSource;
pub use splitter::{scan_statements, split_statements, Scan, ScanMode, Unterminated};
pub use summary::{
    render_report, summarize_rows, write_report, ReportMeta, Summarizer, SummaryKind, SummaryRequest, DEFAULT_LABELS,
    SAMPLE_ROWS,
};
pub use types::StatementItem;
