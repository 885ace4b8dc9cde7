//! 批量切分选项与统计信息（模块）

/// 输出格式
/// - Text：每条语句后另起一行写 `;`，文件之间以注释行分隔，可直接回放到 SQL 客户端。
/// - Json：`[{"file", "index", "sql"}, ...]` 形式的 JSON 数组，流式写出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// 批量切分选项
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// 输出格式
    pub format: OutputFormat,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            max_file_size: None,
            threads: None,
        }
    }
}

/// 切分统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitStats {
    pub files_split: usize,
    pub files_skipped: usize,
    pub statements_written: usize,
    /// 含未闭合块注释/字符串的文件数
    pub unterminated: usize,
}
