// ==========================================
// 分层利率表生成引擎 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::ColumnIndex;
use thiserror::Error;

/// 版式契约错误 (期望 vs 实际)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("层级列数量不符: 期望 {expected} 列，实际 {found} 列")]
    TierColumnCount { expected: usize, found: usize },

    #[error("列 {column} 同时被用作 {first} 与 {second}")]
    ColumnOverlap {
        column: ColumnIndex,
        first: String,
        second: String,
    },

    #[error("哨兵文本为空: {0}")]
    EmptySentinel(String),

    #[error("渠道规则的匹配文本为空 (第 {0} 条)")]
    EmptyChannelRule(usize),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("版式契约无效: {0}")]
    Layout(#[from] LayoutError),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
