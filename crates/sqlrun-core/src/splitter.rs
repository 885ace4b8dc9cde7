//! SQL 语句切分器（单遍扫描 + 一个字符前瞻）
//!
//! 只做“分号在哪里真正结束一条语句”这一件事：
//! - 注释（`--` 行注释、`/* */` 块注释）与字符串（单/双引号）内的 `;` 视为普通内容；
//! - 语句去除首尾空白，空语句（例如 `;;`）直接丢弃；
//! - 终止符 `;` 本身不进入语句文本。
//!
//! 所有标记都是 ASCII，按字节下标扫描时不会落在多字节字符中间，
//! 因此切片 `&sql[start..i]` 总是合法的字符边界。

/// 扫描模式：任一时刻至多处于一种模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// 普通 SQL 文本（不在任何注释或字符串内）
    Code,
    /// `--` 开始，到换行（含）结束
    LineComment,
    /// `/*` 开始，到 `*/`（含）结束
    BlockComment,
    /// `'...'`，内部 `''` 为转义引号
    SingleQuoted,
    /// `"..."`
    DoubleQuoted,
}

impl ScanMode {
    /// 便于日志输出的描述
    pub fn describe(self) -> &'static str {
        match self {
            ScanMode::Code => "code",
            ScanMode::LineComment => "line comment",
            ScanMode::BlockComment => "block comment",
            ScanMode::SingleQuoted => "single-quoted literal",
            ScanMode::DoubleQuoted => "double-quoted literal",
        }
    }
}

/// 输入结束时仍未闭合的块注释或字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated {
    pub mode: ScanMode,
    /// 开始标记在源文本中的字节偏移
    pub offset: usize,
}

impl Unterminated {
    /// 将字节偏移换算为 1 起始的 (行, 列)，列按字符计
    pub fn line_col(&self, sql: &str) -> (usize, usize) {
        let head = &sql[..self.offset.min(sql.len())];
        let line = head.matches('\n').count() + 1;
        let col = head.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0) + 1;
        (line, col)
    }
}

/// 一次扫描的完整结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan<'a> {
    /// 按出现顺序排列的语句（已 trim，非空）
    pub statements: Vec<&'a str>,
    /// 输入结束时未闭合的块注释/字符串；行注释可由文件结尾自然结束，不计入
    pub unterminated: Option<Unterminated>,
}

/// 切分 SQL 文本为独立语句
///
/// 未闭合的块注释或字符串会一直延续到输入末尾，剩余文本整体并入最后一条语句。
pub fn split_statements(sql: &str) -> Vec<&str> {
    scan_statements(sql).statements
}

/// 与 [`split_statements`] 相同，额外返回未闭合注释/字符串的诊断信息
pub fn scan_statements(sql: &str) -> Scan<'_> {
    let bytes = sql.as_bytes();
    let mut mode = ScanMode::Code;
    let mut opened_at = 0usize;
    // 当前语句（累加器）在源文本中的起点
    let mut start = 0usize;
    let mut statements = Vec::new();

    let mut i = 0usize;
    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match mode {
            ScanMode::SingleQuoted => {
                if bytes[i] == b'\'' {
                    if next == Some(b'\'') {
                        // '' 转义：两个字符一起吃掉，仍在字符串内
                        i += 1;
                    } else {
                        mode = ScanMode::Code;
                    }
                }
            }
            ScanMode::DoubleQuoted => {
                if bytes[i] == b'"' {
                    mode = ScanMode::Code;
                }
            }
            ScanMode::LineComment => {
                if bytes[i] == b'\n' {
                    mode = ScanMode::Code;
                }
            }
            ScanMode::BlockComment => {
                if bytes[i] == b'*' && next == Some(b'/') {
                    i += 1;
                    mode = ScanMode::Code;
                }
            }
            ScanMode::Code => match (bytes[i], next) {
                (b'-', Some(b'-')) => {
                    mode = ScanMode::LineComment;
                    opened_at = i;
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    mode = ScanMode::BlockComment;
                    opened_at = i;
                    i += 1;
                }
                (b'\'', _) => {
                    mode = ScanMode::SingleQuoted;
                    opened_at = i;
                }
                (b'"', _) => {
                    mode = ScanMode::DoubleQuoted;
                    opened_at = i;
                }
                (b';', _) => {
                    push_trimmed(&mut statements, &sql[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }

    // 最后一条语句（没有以分号结尾的情况）
    push_trimmed(&mut statements, &sql[start..]);

    let unterminated = match mode {
        ScanMode::Code | ScanMode::LineComment => None,
        other => Some(Unterminated { mode: other, offset: opened_at }),
    };
    Scan { statements, unterminated }
}

fn push_trimmed<'a>(statements: &mut Vec<&'a str>, raw: &'a str) {
    let stmt = raw.trim();
    if !stmt.is_empty() {
        statements.push(stmt);
    }
}
