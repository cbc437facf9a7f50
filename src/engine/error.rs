// ==========================================
// 分层利率表生成引擎 - 引擎层错误类型
// ==========================================
// 职责: 为导入错误补充渠道/产品/工作表上下文,统一写出错误
// 策略: 任一错误中止整次生成,不做重试
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::Channel;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),

    #[error("调整表解析失败 ({path}): {source}")]
    Adjustors { path: String, source: ImportError },

    #[error("客户层级解析失败 ({path}): {source}")]
    CustomerTiers { path: String, source: ImportError },

    #[error("基准网格解析失败 (渠道 {channel}, 产品 {product}, 工作表 {sheet}): {source}")]
    BaseGrid {
        channel: Channel,
        product: String,
        sheet: String,
        source: ImportError,
    },

    #[error("工作簿写出失败 ({path}): {message}")]
    Write { path: String, message: String },

    #[error("产物登记失败: {0}")]
    Sink(String),

    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
