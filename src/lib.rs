// ==========================================
// 分层利率表生成引擎 - 核心库
// ==========================================
// 输入: 调整表工作簿、渠道基准工作簿、客户层级 CSV
// 输出: 每个 渠道 × 产品 × 层级 一份调整后的利率表工作簿
// 技术栈: calamine (读) + rust_xlsxwriter (写)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 源文件解析
pub mod importer;

// 引擎层 - 调整、写出与编排
pub mod engine;

// 配置层 - 引擎配置与版式契约
pub mod config;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CellValue, Channel, ColumnIndex};

// 领域实体
pub use domain::{
    AdjustmentTable, CustomerTier, GridLocation, OutputArtifact, PriceGrid, ProductAdjustment,
    TierMapping,
};

// 导入
pub use importer::{
    AdjustorSheetParser, BaseGridParser, CustomerTierParser, ImportError, TierMappingExtractor,
    WorkbookSnapshot,
};

// 引擎
pub use engine::{
    ArtifactSink, EngineError, GenerationOrchestrator, GenerationPlan, GenerationReport,
    GridAdjuster, JsonManifestSink, SourceDocuments, WorkbookWriter,
};

// 配置
pub use config::{ConfigError, EngineConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "分层利率表生成引擎";
