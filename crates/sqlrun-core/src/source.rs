//! SQL 文件加载（存在性 / 空文件检查 + 切分）
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, SqlrunError};
use crate::splitter::{scan_statements, split_statements, Scan};

/// 已读入内存的 SQL 文件
#[derive(Debug, Clone)]
pub struct SqlSource {
    path: PathBuf,
    text: String,
}

impl SqlSource {
    /// 读取文件；不存在返回 `NotFound`，trim 后为空返回 `Empty`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SqlrunError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| SqlrunError::Io { path: path.to_path_buf(), source })?;
        Self::from_text(path, text)
    }

    /// 直接由文本构造（不访问文件系统）
    pub fn from_text(path: impl Into<PathBuf>, text: String) -> Result<Self> {
        let path = path.into();
        if text.trim().is_empty() {
            return Err(SqlrunError::Empty(path));
        }
        Ok(Self { path, text })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn statements(&self) -> Vec<&str> {
        split_statements(&self.text)
    }

    pub fn scan(&self) -> Scan<'_> {
        scan_statements(&self.text)
    }

    /// 取待执行的语句：多条时只取第一条并给出警告
    pub fn first_statement(&self) -> &str {
        let scan = self.scan();
        if let Some(open) = scan.unterminated {
            let (line, col) = open.line_col(&self.text);
            warn!(path = %self.path.display(), line, col, "unterminated {} runs to end of file", open.mode.describe());
        }
        if scan.statements.len() > 1 {
            warn!(
                path = %self.path.display(),
                count = scan.statements.len(),
                "file contains multiple statements; only the first one is used"
            );
        }
        match scan.statements.first().copied() {
            Some(stmt) => stmt,
            // 只有分号的文件：退回整段文本
            None => self.text.trim(),
        }
    }
}
