// ==========================================
// 分层利率表生成引擎 - 层级映射提取
// ==========================================
// 规则: 12 个层级列全部非空的行为候选行
//       倒数第二个候选行 = 数字序号,最后一个候选行 = 层级代码
// 红线: 只使用最后两行,不在多行之间猜测
// ==========================================

use crate::config::AdjustorLayout;
use crate::domain::tier::{TierMapping, TIER_COUNT};
use crate::importer::error::{cell_ref, ImportError, ImportResult};
use crate::importer::sheet::SheetTable;
use tracing::debug;

pub struct TierMappingExtractor<'a> {
    layout: &'a AdjustorLayout,
}

impl<'a> TierMappingExtractor<'a> {
    pub fn new(layout: &'a AdjustorLayout) -> Self {
        Self { layout }
    }

    /// 从渠道工作表提取层级映射
    ///
    /// # 错误
    /// - MappingNotFound: 候选行少于 2 行
    /// - TierIndexInvalid: 序号行存在非 1..=12 整数
    /// - TierMappingConflict: 序号或代码重复
    pub fn extract(&self, sheet: &SheetTable) -> ImportResult<TierMapping> {
        let candidates: Vec<usize> = (0..sheet.height())
            .filter(|&row| {
                self.layout
                    .tier_columns
                    .iter()
                    .all(|col| !sheet.cell(row, col.get()).is_empty())
            })
            .collect();

        if candidates.len() < 2 {
            return Err(ImportError::MappingNotFound {
                sheet: sheet.name().to_string(),
                found: candidates.len(),
            });
        }

        let index_row = candidates[candidates.len() - 2];
        let code_row = candidates[candidates.len() - 1];

        let mut pairs = Vec::with_capacity(TIER_COUNT);
        for col in &self.layout.tier_columns {
            let index = self.parse_index(sheet, index_row, col.get())?;
            let code = sheet.cell(code_row, col.get()).render().trim().to_string();
            pairs.push((index, code));
        }

        let mapping = TierMapping::from_pairs(pairs).map_err(|(index, code)| {
            ImportError::TierMappingConflict {
                sheet: sheet.name().to_string(),
                index,
                code,
            }
        })?;

        debug!(
            sheet = sheet.name(),
            index_row = index_row + 1,
            code_row = code_row + 1,
            "层级映射提取完成"
        );
        Ok(mapping)
    }

    fn parse_index(&self, sheet: &SheetTable, row: usize, col: usize) -> ImportResult<u32> {
        let cell = sheet.cell(row, col);
        let invalid = || ImportError::TierIndexInvalid {
            sheet: sheet.name().to_string(),
            cell: cell_ref(row, col),
            value: cell.render(),
        };

        let value = cell.as_f64().ok_or_else(invalid)?;
        if value.fract() != 0.0 || value < 1.0 || value > TIER_COUNT as f64 {
            return Err(invalid());
        }
        Ok(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CellValue;

    /// 构建一行: 前 4 列给定,其后为 12 个层级列
    fn row(prefix: &[CellValue], tiers: Vec<CellValue>) -> Vec<CellValue> {
        let mut cells = prefix.to_vec();
        cells.resize(4, CellValue::Empty);
        cells.extend(tiers);
        cells
    }

    fn numbers(values: impl Iterator<Item = f64>) -> Vec<CellValue> {
        values.map(CellValue::Number).collect()
    }

    fn codes(codes: impl Iterator<Item = String>) -> Vec<CellValue> {
        codes.map(CellValue::Text).collect()
    }

    #[test]
    fn test_last_two_candidate_rows_used() {
        let sheet = SheetTable::from_rows(
            "NQM DEL INPUT",
            vec![
                // 表头行: 也是完整填充的候选行,但不是最后两行
                row(&[], codes((1..=12).map(|i| format!("TIER {} - DEL TOTAL", i)))),
                row(&[CellValue::Text("FULLDOC".into())], vec![]),
                row(&[CellValue::Empty, CellValue::Text("P1".into())], numbers((1..=12).map(|i| i as f64 * 0.1))),
                row(&[], numbers((1..=12).map(|i| i as f64))),
                row(&[], codes((1..=12).map(|i| format!("NA{}", i)))),
            ],
        );

        let layout = AdjustorLayout::default();
        let mapping = TierMappingExtractor::new(&layout).extract(&sheet).unwrap();

        assert_eq!(mapping.len(), 12);
        assert_eq!(mapping.code_for(1), Some("NA1"));
        assert_eq!(mapping.index_for("NA12"), Some(12));
        for (index, code) in mapping.iter() {
            assert_eq!(mapping.index_for(code), Some(index));
        }
    }

    #[test]
    fn test_permuted_codes_follow_column_position() {
        let sheet = SheetTable::from_rows(
            "DEL",
            vec![
                row(&[], numbers((1..=12).rev().map(|i| i as f64))),
                row(&[], codes((1..=12).map(|i| format!("NA{}", i)))),
            ],
        );

        let layout = AdjustorLayout::default();
        let mapping = TierMappingExtractor::new(&layout).extract(&sheet).unwrap();
        assert_eq!(mapping.code_for(12), Some("NA1"));
        assert_eq!(mapping.code_for(1), Some("NA12"));
    }

    #[test]
    fn test_single_candidate_row_fails() {
        let sheet = SheetTable::from_rows(
            "DEL",
            vec![row(&[], codes((1..=12).map(|i| format!("NA{}", i))))],
        );

        let layout = AdjustorLayout::default();
        match TierMappingExtractor::new(&layout).extract(&sheet) {
            Err(ImportError::MappingNotFound { sheet, found }) => {
                assert_eq!(sheet, "DEL");
                assert_eq!(found, 1);
            }
            other => panic!("期望 MappingNotFound,实际: {:?}", other),
        }
    }

    #[test]
    fn test_partially_filled_rows_are_not_candidates() {
        let mut partial = numbers((1..=12).map(|i| i as f64));
        partial[5] = CellValue::Empty;
        let sheet = SheetTable::from_rows(
            "DEL",
            vec![
                row(&[], partial),
                row(&[], codes((1..=12).map(|i| format!("NA{}", i)))),
            ],
        );

        let layout = AdjustorLayout::default();
        assert!(matches!(
            TierMappingExtractor::new(&layout).extract(&sheet),
            Err(ImportError::MappingNotFound { found: 1, .. })
        ));
    }

    #[test]
    fn test_non_integer_index_rejected() {
        let mut indices = numbers((1..=12).map(|i| i as f64));
        indices[0] = CellValue::Number(1.5);
        let sheet = SheetTable::from_rows(
            "DEL",
            vec![
                row(&[], indices),
                row(&[], codes((1..=12).map(|i| format!("NA{}", i)))),
            ],
        );

        let layout = AdjustorLayout::default();
        match TierMappingExtractor::new(&layout).extract(&sheet) {
            Err(ImportError::TierIndexInvalid { cell, .. }) => assert_eq!(cell, "E1"),
            other => panic!("期望 TierIndexInvalid,实际: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let mut tier_codes = codes((1..=12).map(|i| format!("NA{}", i)));
        tier_codes[11] = CellValue::Text("NA1".into());
        let sheet = SheetTable::from_rows(
            "DEL",
            vec![row(&[], numbers((1..=12).map(|i| i as f64))), row(&[], tier_codes)],
        );

        let layout = AdjustorLayout::default();
        assert!(matches!(
            TierMappingExtractor::new(&layout).extract(&sheet),
            Err(ImportError::TierMappingConflict { index: 12, .. })
        ));
    }
}
