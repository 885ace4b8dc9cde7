//! 结果导出（CSV / JSON）
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::collab::RowSet;
use crate::error::{Result, SqlrunError};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = SqlrunError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(SqlrunError::InvalidArgs(format!("unsupported export format: {other}"))),
        }
    }
}

/// 将结果集写入 `path`，父目录不存在时自动创建
pub fn export_rows(rows: &RowSet, format: ExportFormat, path: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| SqlrunError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    match format {
        ExportFormat::Csv => write_csv(rows, &mut out)?,
        ExportFormat::Json => write_json(rows, &mut out)?,
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

/// CSV：表头 + 每行一条记录；无数据行时不写表头
pub fn write_csv<W: Write>(rows: &RowSet, out: W) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut w = csv::Writer::from_writer(out);
    w.write_record(&rows.columns)?;
    for row in &rows.rows {
        w.write_record(row.iter().map(cell_text))?;
    }
    w.flush().map_err(|e| SqlrunError::Export(e.to_string()))?;
    Ok(())
}

/// JSON：缩进两格的对象数组，非 ASCII 字符原样输出
pub fn write_json<W: Write>(rows: &RowSet, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, &rows.records())?;
    Ok(())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
