//! 错误类型定义
//!
//! 解析接口本身从不返回错误（无法识别时返回 `None`），
//! 这里的错误只出现在参考数据加载阶段。

use thiserror::Error;

/// 参考数据错误
#[derive(Debug, Error)]
pub enum GeoError {
    /// 数据加载失败
    #[error("Failed to load reference data: {0}")]
    DataLoadError(String),

    /// CSV 格式错误
    #[error("Malformed reference CSV: {0}")]
    Csv(#[from] csv::Error),

    /// 记录违反表约束
    #[error("Invalid record in {table} table at line {line}: {reason}")]
    InvalidRecord {
        table: &'static str,
        line: u64,
        reason: String,
    },

    /// 不支持的语言
    #[error("Unknown language tag: {0}")]
    UnknownLanguage(String),
}

/// 本库的 Result 别名
pub type Result<T> = std::result::Result<T, GeoError>;
