// ==========================================
// 分层利率表生成引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod adjustment;
pub mod artifact;
pub mod customer;
pub mod grid;
pub mod tier;
pub mod types;

// 重导出核心类型
pub use adjustment::{AdjustmentTable, ChannelAdjustments, ProductAdjustment, TierAdjustment};
pub use artifact::OutputArtifact;
pub use customer::CustomerTier;
pub use grid::{GridLocation, GridRow, PriceColumn, PriceGrid};
pub use tier::{default_tier_codes, TierMapping, TIER_COUNT};
pub use types::{CellValue, Channel, ColumnIndex};
