//! 外部协作方接口（查询执行 / 文本生成）与结果集类型
//!
//! 具体的数据仓库客户端与生成式 API 客户端不在本仓库内，
//! 调用方实现这两个 trait 后注入 `QueryRunner` / `Summarizer`。
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// 查询结果集：列名顺序即 schema 顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按列名组装为对象（保持列顺序）；缺失的单元格记为 null
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| (col.clone(), row.get(i).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}

/// 一次查询的返回
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub bytes_processed: u64,
    /// dry run 时为空
    pub rows: RowSet,
    /// 服务端报告的执行耗时；缺省时由调用方自行计时
    pub elapsed: Option<Duration>,
}

/// 查询执行协作方
pub trait QueryExecutor {
    fn execute(&self, sql: &str, dry_run: bool) -> Result<QueryOutcome, String>;
}

/// 文本生成协作方
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, String>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, sql: &str, dry_run: bool) -> Result<QueryOutcome, String> {
        (**self).execute(sql, dry_run)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str) -> Result<String, String> {
        (**self).generate(prompt)
    }
}
