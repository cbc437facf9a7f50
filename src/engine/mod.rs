// ==========================================
// 分层利率表生成引擎 - 引擎层
// ==========================================
// 职责: 网格调整、工作簿写出、生成编排
// 红线: 源工作簿只读,输出路径由命名规则唯一决定
// ==========================================

pub mod error;
pub mod grid_adjuster;
pub mod naming;
pub mod orchestrator;
pub mod plan;
pub mod sink;
pub mod workbook_writer;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use grid_adjuster::GridAdjuster;
pub use naming::OutputName;
pub use orchestrator::{GenerationOrchestrator, GenerationReport, SourceDocuments};
pub use plan::{GenerationCell, GenerationPlan, PlannedTier, ProductPlan};
pub use sink::{ArtifactSink, JsonManifestSink, NoOpSink};
pub use workbook_writer::WorkbookWriter;
