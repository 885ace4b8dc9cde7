//! 结果集摘要、提示词构造与生成式文本调用
use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::collab::{RowSet, TextGenerator};
use crate::error::{Result, SqlrunError};

/// 摘要中保留的样例行数
pub const SAMPLE_ROWS: usize = 5;

pub const DEFAULT_LABELS: (&str, &str) = ("Ethereum", "Solana");

/// 将结果集压缩为便于放入提示词的摘要
///
/// 数值列以首行的取值类型判定（布尔值也算数值）；统计只计入非空的数值单元格。
pub fn summarize_rows(rows: &RowSet) -> Value {
    if rows.is_empty() {
        return json!({ "message": "no rows returned" });
    }
    let records = rows.records();
    let first = &rows.rows[0];

    let mut summary = Map::new();
    summary.insert("total_rows".into(), json!(rows.len()));
    summary.insert("columns".into(), json!(rows.columns));
    summary.insert("sample_data".into(), json!(records.iter().take(SAMPLE_ROWS).collect::<Vec<_>>()));

    let mut stats = Map::new();
    for (idx, col) in rows.columns.iter().enumerate() {
        if !first.get(idx).map_or(false, |v| numeric(v).is_some()) {
            continue;
        }
        let values: Vec<f64> = rows.rows.iter().filter_map(|r| r.get(idx).and_then(numeric)).collect();
        if values.is_empty() {
            continue;
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        stats.insert(
            col.clone(),
            json!({
                "sum": sum,
                "avg": sum / values.len() as f64,
                "min": min,
                "max": max,
                "count": values.len(),
            }),
        );
    }
    if !stats.is_empty() {
        summary.insert("statistics".into(), Value::Object(stats));
    }
    Value::Object(summary)
}

/// 数值单元格；布尔值按 1 / 0 计入
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

/// 摘要类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryKind {
    #[default]
    Weekly,
    Comparison,
    Anomalies,
    Custom,
}

impl SummaryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryKind::Weekly => "weekly",
            SummaryKind::Comparison => "comparison",
            SummaryKind::Anomalies => "anomalies",
            SummaryKind::Custom => "custom",
        }
    }
}

impl FromStr for SummaryKind {
    type Err = SqlrunError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(SummaryKind::Weekly),
            "comparison" => Ok(SummaryKind::Comparison),
            "anomalies" => Ok(SummaryKind::Anomalies),
            "custom" => Ok(SummaryKind::Custom),
            other => Err(SqlrunError::InvalidArgs(format!("unknown summary type: {other}"))),
        }
    }
}

/// 一次摘要请求
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub kind: SummaryKind,
    pub custom_prompt: Option<String>,
    pub labels: (String, String),
}

impl SummaryRequest {
    pub fn new(kind: SummaryKind) -> Self {
        Self {
            kind,
            custom_prompt: None,
            labels: (DEFAULT_LABELS.0.to_string(), DEFAULT_LABELS.1.to_string()),
        }
    }

    /// 在执行任何查询之前校验参数组合
    pub fn validate(&self, inputs: usize) -> Result<()> {
        match self.kind {
            SummaryKind::Comparison if inputs != 2 => Err(SqlrunError::InvalidArgs(
                "comparison summary needs exactly two SQL files".into(),
            )),
            SummaryKind::Custom if self.custom_prompt.as_deref().map_or(true, |p| p.trim().is_empty()) => {
                Err(SqlrunError::InvalidArgs("custom summary needs a custom prompt".into()))
            }
            _ if inputs == 0 => Err(SqlrunError::InvalidArgs("at least one SQL file is required".into())),
            _ => Ok(()),
        }
    }

    /// 构造提示词；`inputs` 为各结果集的摘要（见 [`summarize_rows`]）
    pub fn build_prompt(&self, inputs: &[Value]) -> Result<String> {
        self.validate(inputs.len())?;
        let data = pretty(&inputs[0]);
        let prompt = match self.kind {
            SummaryKind::Weekly => format!(
                "You are a blockchain data analyst. Using the on-chain data below, write a weekly \
summary report readable by institutional investors and brokerages.

## Data summary
{data}

## Requirements
1. Summarize the three key metrics in one sentence each
2. Mention week-over-week change where possible
3. Call out notable anomalies or patterns
4. Keep the tone professional but easy to follow
5. Use 3-5 sentences in total

## Output format
[Weekly summary]
(content)

[Key changes]
(content)

[Anomalies]
(content, or \"No notable anomalies\")
"
            ),
            SummaryKind::Comparison => {
                let (l1, l2) = (&self.labels.0, &self.labels.1);
                let other = pretty(&inputs[1]);
                format!(
                    "Below is on-chain data for the {l1} and {l2} networks.
Compare the two networks and write a three-line summary from an institutional investor's perspective.

## {l1} data
{data}

## {l2} data
{other}

## Requirements
1. Compare throughput (transaction count)
2. Compare fee efficiency
3. Compare network activity
4. Support each network's strengths with the data
5. Keep it to three concise lines
"
                )
            }
            SummaryKind::Anomalies => format!(
                "Find anomalies or notable patterns in the on-chain data below.

## Data
{data}

## Analysis
1. Identify unusual spikes or drops
2. Infer possible causes (events, market conditions, ...)
3. Suggest items that need further investigation

If there are no anomalies, answer \"No notable anomalies\".
"
            ),
            SummaryKind::Custom => {
                let custom = self.custom_prompt.as_deref().unwrap_or_default();
                format!("{custom}\n\n## Data\n{data}\n")
            }
        };
        Ok(prompt)
    }
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

/// 生成式摘要器：包装一个 `TextGenerator`
pub struct Summarizer<G> {
    generator: G,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// 对一个或两个结果集生成摘要文本
    pub fn summarize(&self, request: &SummaryRequest, results: &[RowSet]) -> Result<String> {
        let inputs: Vec<Value> = results.iter().map(summarize_rows).collect();
        let prompt = request.build_prompt(&inputs)?;
        info!(kind = request.kind.as_str(), prompt_len = prompt.len(), "requesting summary");
        self.generator.generate(&prompt).map_err(SqlrunError::Generation)
    }
}

/// 报告元信息
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Local>,
    pub sources: Vec<String>,
    pub kind: SummaryKind,
}

/// 渲染摘要报告文本
pub fn render_report(meta: &ReportMeta, summary: &str) -> String {
    format!(
        "# Summary report\n\nGenerated at: {}\n\nQuery files: {}\nSummary type: {}\n\n---\n\n{}",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S"),
        meta.sources.join(", "),
        meta.kind.as_str(),
        summary
    )
}

/// 写出摘要报告，父目录不存在时自动创建
pub fn write_report(path: &Path, meta: &ReportMeta, summary: &str) -> Result<()> {
    let io_err = |source: std::io::Error| SqlrunError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, render_report(meta, summary)).map_err(io_err)
}
