// ==========================================
// 分层利率表生成引擎 - 配置层
// ==========================================
// 职责: 引擎配置与版式契约
// 存储: TOML 文件 + 环境变量覆盖
// ==========================================

pub mod engine_config;
pub mod error;
pub mod layout;

// 重导出核心配置
pub use engine_config::{config_keys, EngineConfig, MalformedRowPolicy, ProductSpec};
pub use error::{ConfigError, ConfigResult, LayoutError};
pub use layout::{AdjustorLayout, BaseGridLayout, ChannelRule};
