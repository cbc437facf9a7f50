// ==========================================
// 分层利率表生成引擎 - 导入层
// ==========================================
// 职责: 把无固定结构的 Excel / CSV 源文件解析为领域对象
// 支持: Excel (.xlsx), CSV
// ==========================================

// 模块声明
pub mod adjustor_parser;
pub mod base_grid_parser;
pub mod customer_parser;
pub mod error;
pub mod sheet;
pub mod tier_mapping;

// 重导出核心类型
pub use adjustor_parser::AdjustorSheetParser;
pub use base_grid_parser::BaseGridParser;
pub use customer_parser::{CustomerTierParser, CUSTOMER_TIER_HEADERS};
pub use error::{ImportError, ImportResult};
pub use sheet::{SheetTable, WorkbookSnapshot};
pub use tier_mapping::TierMappingExtractor;
