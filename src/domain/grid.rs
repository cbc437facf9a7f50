// ==========================================
// 分层利率表生成引擎 - 价格网格
// ==========================================
// 结构: 票面利率 × 价格列
// 约束: 数据行紧接哨兵行之下连续排列
// ==========================================

use crate::domain::types::ColumnIndex;
use serde::Serialize;

/// 价格列 (列号 + 表头文本)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceColumn {
    pub index: ColumnIndex,
    pub label: String,
}

/// 网格在工作表中的位置 (改写输出时只触碰此区域)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLocation {
    pub sheet_name: String,
    /// 哨兵所在行 (零基)
    pub header_row: u32,
    pub note_rate_column: ColumnIndex,
    /// 票面利率列的原始表头
    pub note_rate_label: String,
    pub first_data_row: u32,
    /// 不含
    pub end_row: u32,
    pub price_columns: Vec<PriceColumn>,
}

impl GridLocation {
    pub fn row_count(&self) -> usize {
        (self.end_row - self.first_data_row) as usize
    }

    /// 网格行号 → 工作表行号
    pub fn sheet_row(&self, grid_row: usize) -> u32 {
        self.first_data_row + grid_row as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub note_rate: Option<f64>,
    /// 与 `GridLocation::price_columns` 按位置对齐
    pub prices: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceGrid {
    pub location: GridLocation,
    pub rows: Vec<GridRow>,
}

impl PriceGrid {
    pub fn price_columns(&self) -> &[PriceColumn] {
        &self.location.price_columns
    }

    /// 按表头名取某列全部价格
    pub fn column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        let pos = self
            .location
            .price_columns
            .iter()
            .position(|c| c.label == label)?;
        Some(self.rows.iter().map(|r| r.prices[pos]).collect())
    }

    pub fn note_rates(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.note_rate).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
