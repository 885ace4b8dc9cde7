//! 公共类型（对外暴露）
use serde::Serialize;

/// 输出项结构（对应 JSON 输出数组的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct StatementItem<'a> {
    pub file: &'a str,
    /// 语句在文件内的序号（从 1 开始）
    pub index: usize,
    pub sql: &'a str,
}
