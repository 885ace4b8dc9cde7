//! 单条查询的执行流程：读文件 → 取首条语句 → 执行（或 dry run）→ 估算费用 → 可选导出
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::collab::{QueryExecutor, RowSet};
use crate::error::{Result, SqlrunError};
use crate::export::{export_rows, ExportFormat};
use crate::source::SqlSource;

/// 按需计费单价（美元 / TiB）
pub const COST_PER_TIB_USD: f64 = 5.0;

const TIB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0;

/// 按处理字节数估算查询费用
pub fn estimate_cost_usd(bytes_processed: u64) -> f64 {
    bytes_processed as f64 / TIB * COST_PER_TIB_USD
}

/// 人类可读的字节数，例如 `1.50 KB`
pub fn format_bytes(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if n < 1024.0 {
            return format!("{n:.2} {unit}");
        }
        n /= 1024.0;
    }
    format!("{n:.2} PB")
}

/// 执行参数
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// 结果导出路径；为空则不导出
    pub output: Option<PathBuf>,
    pub format: ExportFormat,
}

/// 执行结果摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub bytes_processed: u64,
    pub estimated_cost_usd: f64,
    pub duration_secs: f64,
    /// dry run 时为空
    pub total_rows: Option<usize>,
    pub output_file: Option<PathBuf>,
}

impl RunReport {
    pub fn bytes_display(&self) -> String {
        format_bytes(self.bytes_processed)
    }
}

/// 查询执行器：包装一个 `QueryExecutor`
pub struct QueryRunner<E> {
    executor: E,
    project_id: String,
}

impl<E: QueryExecutor> QueryRunner<E> {
    pub fn new(executor: E, project_id: impl Into<String>) -> Self {
        Self { executor, project_id: project_id.into() }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// 读取 SQL 文件并执行其中第一条语句
    pub fn run_file(&self, path: &Path, opts: &RunOptions) -> Result<RunReport> {
        let source = SqlSource::load(path)?;
        self.run_sql(source.first_statement(), opts)
    }

    /// 执行一条语句
    pub fn run_sql(&self, sql: &str, opts: &RunOptions) -> Result<RunReport> {
        debug!(project = %self.project_id, dry_run = opts.dry_run, "executing statement");
        let started = Instant::now();
        let outcome = self.executor.execute(sql, opts.dry_run).map_err(SqlrunError::Query)?;
        let duration = outcome.elapsed.unwrap_or_else(|| started.elapsed());

        let mut report = RunReport {
            dry_run: opts.dry_run,
            bytes_processed: outcome.bytes_processed,
            estimated_cost_usd: estimate_cost_usd(outcome.bytes_processed),
            duration_secs: duration.as_secs_f64(),
            total_rows: None,
            output_file: None,
        };
        if opts.dry_run {
            return Ok(report);
        }

        report.total_rows = Some(outcome.rows.len());
        if let Some(path) = &opts.output {
            export_rows(&outcome.rows, opts.format, path)?;
            report.output_file = Some(path.clone());
        }
        info!(
            project = %self.project_id,
            bytes = %report.bytes_display(),
            rows = outcome.rows.len(),
            "query finished"
        );
        Ok(report)
    }

    /// 执行语句并直接返回结果集（供摘要流程使用）
    pub fn fetch_rows(&self, sql: &str) -> Result<RowSet> {
        let outcome = self.executor.execute(sql, false).map_err(SqlrunError::Query)?;
        Ok(outcome.rows)
    }

    /// 读取文件、取首条语句并返回结果集
    pub fn fetch_file(&self, path: &Path) -> Result<RowSet> {
        let source = SqlSource::load(path)?;
        self.fetch_rows(source.first_statement())
    }
}
