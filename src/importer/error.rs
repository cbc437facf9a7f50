// ==========================================
// 分层利率表生成引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 版式类错误必须带出工作簿/工作表/单元格定位
// ==========================================

use crate::config::LayoutError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作表不存在 (工作簿 {workbook}): {sheet}")]
    SheetNotFound { workbook: String, sheet: String },

    // ===== 版式错误 =====
    #[error("未找到层级映射行 (工作表 {sheet}): 期望至少 2 行完整填充的层级列，实际 {found} 行")]
    MappingNotFound { sheet: String, found: usize },

    #[error("层级映射冲突 (工作表 {sheet}): 序号 {index} / 代码 {code} 重复")]
    TierMappingConflict {
        sheet: String,
        index: u32,
        code: String,
    },

    #[error("层级序号无效 (工作表 {sheet}, 单元格 {cell}): 期望 1..=12 的整数，实际 {value}")]
    TierIndexInvalid {
        sheet: String,
        cell: String,
        value: String,
    },

    #[error("未找到网格表头 (工作簿 {workbook}, 工作表 {sheet}): 期望单元格文本 \"{sentinel}\"")]
    GridHeaderNotFound {
        workbook: String,
        sheet: String,
        sentinel: String,
    },

    #[error("单元格不是数值 (工作表 {sheet}, 单元格 {cell}): {value}")]
    NonNumericCell {
        sheet: String,
        cell: String,
        value: String,
    },

    #[error("调整表数据行不完整 (工作表 {sheet}, 行 {row}, 产品组 {group}): {message}")]
    MalformedAdjustorRow {
        sheet: String,
        row: usize,
        group: String,
        message: String,
    },

    #[error("版式契约无效: {0}")]
    Layout(#[from] LayoutError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Excel 单元格地址 (零基行列 → "E12")
pub fn cell_ref(row: usize, col: usize) -> String {
    format!(
        "{}{}",
        crate::domain::ColumnIndex(col as u16).letter(),
        row + 1
    )
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
