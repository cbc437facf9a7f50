// ==========================================
// 分层利率表生成引擎 - 网格调整器
// ==========================================
// 纯函数: 每个价格单元格 + delta,票面利率与位置信息原样保留
// 空价格单元格保持为空
// ==========================================

use crate::domain::grid::{GridRow, PriceGrid};

pub struct GridAdjuster;

impl GridAdjuster {
    pub fn adjust(grid: &PriceGrid, delta: f64) -> PriceGrid {
        PriceGrid {
            location: grid.location.clone(),
            rows: grid
                .rows
                .iter()
                .map(|row| GridRow {
                    note_rate: row.note_rate,
                    prices: row.prices.iter().map(|p| p.map(|v| v + delta)).collect(),
                })
                .collect(),
        }
    }
}
