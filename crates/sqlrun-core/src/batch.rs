//! 批量切分主流程与并行调度
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::options::{OutputFormat, SplitOptions, SplitStats};
use crate::splitter::{scan_statements, Unterminated};
use crate::types::StatementItem;

/// 单个文件的切分结果
#[derive(Debug, Clone)]
pub struct FileSplit {
    pub path: PathBuf,
    pub statements: Vec<String>,
    /// 未闭合的块注释/字符串及其 (行, 列)
    pub unterminated: Option<(Unterminated, (usize, usize))>,
}

/// 展开输入列表：目录只看第一层的 `.sql` 文件并按文件名排序；显式给出的文件原样保留
pub fn collect_sql_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = vec![];
            for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
                let entry = match entry { Ok(e) => e, Err(_) => continue };
                if entry.file_type().is_file() && is_sql_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            // 按文件名排序，确保输出顺序稳定
            found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("SQL file not found: {}", input.display());
        }
    }
    Ok(files)
}

fn is_sql_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map_or(false, |e| e.eq_ignore_ascii_case("sql"))
}

/// 读取并切分单个文件；超过大小上限时返回 `Ok(None)`
pub fn split_file(path: &Path, max_file_size: Option<u64>) -> Result<Option<FileSplit>> {
    if let Some(max) = max_file_size {
        let md = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        if md.len() > max {
            debug!(path = %path.display(), size = md.len(), "skipping oversized file");
            return Ok(None);
        }
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let scan = scan_statements(&text);
    let unterminated = scan.unterminated.map(|u| (u, u.line_col(&text)));
    Ok(Some(FileSplit {
        path: path.to_path_buf(),
        statements: scan.statements.iter().map(|s| s.to_string()).collect(),
        unterminated,
    }))
}

/// 切分所有输入并写入 `out`
/// 稳定性保证：输出顺序与 [`collect_sql_files`] 的顺序一致，与线程数无关
pub fn split_and_write(inputs: &[PathBuf], out: &mut dyn Write, opts: &SplitOptions) -> Result<SplitStats> {
    let files = collect_sql_files(inputs)?;
    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    let max_file_size = opts.max_file_size;

    // 决策：多文件且线程数>1 时走 Rayon 线程池；collect 保持输入顺序
    let results: Vec<Result<Option<FileSplit>>> = if threads > 1 && files.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("build rayon pool")?;
        pool.install(|| files.par_iter().map(|p| split_file(p, max_file_size)).collect())
    } else {
        files.iter().map(|p| split_file(p, max_file_size)).collect()
    };

    let mut stats = SplitStats::default();
    let mut writer = StatementWriter::begin(out, opts.format)?;
    for (path, res) in files.iter().zip(results) {
        match res {
            Ok(Some(split)) => {
                stats.files_split += 1;
                if let Some((open, (line, col))) = split.unterminated {
                    stats.unterminated += 1;
                    warn!(path = %path.display(), line, col, "unterminated {} runs to end of file", open.mode.describe());
                }
                stats.statements_written += writer.write_file(&split)?;
            }
            Ok(None) => stats.files_skipped += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                stats.files_skipped += 1;
            }
        }
    }
    writer.finish()?;
    Ok(stats)
}

/// 流式输出：Text 直接逐条写，Json 维护数组分隔符
struct StatementWriter<'w> {
    out: &'w mut dyn Write,
    format: OutputFormat,
    first: bool,
}

impl<'w> StatementWriter<'w> {
    fn begin(out: &'w mut dyn Write, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Json {
            write!(out, "[")?;
        }
        Ok(Self { out, format, first: true })
    }

    fn write_file(&mut self, split: &FileSplit) -> Result<usize> {
        let file = split.path.to_string_lossy();
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "-- file: {file}")?;
                // 终止符单独成行：语句可能以 `--` 行注释结尾
                for stmt in &split.statements {
                    writeln!(self.out, "{stmt}\n;\n")?;
                }
            }
            OutputFormat::Json => {
                for (i, stmt) in split.statements.iter().enumerate() {
                    if !self.first { write!(self.out, ",")?; } else { self.first = false; }
                    let item = StatementItem { file: &file, index: i + 1, sql: stmt };
                    serde_json::to_writer(&mut *self.out, &item)?;
                }
            }
        }
        Ok(split.statements.len())
    }

    fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            write!(self.out, "]")?;
        }
        Ok(())
    }
}
