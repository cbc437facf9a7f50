// ==========================================
// 分层利率表生成引擎 - 调整表解析器
// ==========================================
// 输入: 调整表工作簿,每个工作表对应一个渠道
// 输出: 渠道 → 产品组 → {基准价, 产品编号, 产品名称, 层级调整}
// ==========================================
// 行规则 (按顺序):
// 1. 标签列 == "GRID"       → 结束当前产品组
// 2. 标签列为非空文本        → 开启产品组 (去空白 + 大写)
// 3. 产品组有效且编号/名称非空 → 数据行
// 4. 其余行跳过
// ==========================================

use crate::config::{AdjustorLayout, MalformedRowPolicy};
use crate::domain::adjustment::{AdjustmentTable, ChannelAdjustments, ProductAdjustment, TierAdjustment};
use crate::domain::tier::TierMapping;
use crate::domain::types::CellValue;
use crate::importer::error::{cell_ref, ImportError, ImportResult};
use crate::importer::sheet::{SheetTable, WorkbookSnapshot};
use crate::importer::tier_mapping::TierMappingExtractor;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct AdjustorSheetParser<'a> {
    layout: &'a AdjustorLayout,
    policy: MalformedRowPolicy,
}

impl<'a> AdjustorSheetParser<'a> {
    pub fn new(layout: &'a AdjustorLayout, policy: MalformedRowPolicy) -> Self {
        Self { layout, policy }
    }

    /// 读取并解析调整表工作簿
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<AdjustmentTable> {
        let workbook = WorkbookSnapshot::load(file_path)?;
        self.parse_workbook(&workbook)
    }

    /// 解析整个工作簿 (每个工作表一个渠道)
    pub fn parse_workbook(&self, workbook: &WorkbookSnapshot) -> ImportResult<AdjustmentTable> {
        self.layout.validate()?;

        let mut table = AdjustmentTable::new();
        for sheet in workbook.sheets() {
            let channel = self.layout.channel_for_sheet(sheet.name());
            let adjustments = self.parse_sheet(sheet)?;

            info!(
                sheet = sheet.name(),
                channel = %channel,
                groups = adjustments.len(),
                "调整表工作表解析完成"
            );

            if table.insert_channel(channel, adjustments) {
                warn!(
                    sheet = sheet.name(),
                    channel = %channel,
                    "多个工作表归入同一渠道,后者覆盖前者"
                );
            }
        }

        Ok(table)
    }

    /// 解析单个渠道工作表
    pub fn parse_sheet(&self, sheet: &SheetTable) -> ImportResult<ChannelAdjustments> {
        let mapping = TierMappingExtractor::new(self.layout).extract(sheet)?;
        self.parse_sheet_with_mapping(sheet, &mapping)
    }

    fn parse_sheet_with_mapping(
        &self,
        sheet: &SheetTable,
        mapping: &TierMapping,
    ) -> ImportResult<ChannelAdjustments> {
        let mut groups = ChannelAdjustments::new();
        let mut current_group: Option<String> = None;

        for row in 0..sheet.height() {
            let label = sheet.cell(row, self.layout.label_column.get());

            if label.as_text() == Some(self.layout.group_reset_sentinel.as_str()) {
                current_group = None;
                continue;
            }

            if let Some(text) = label.as_text() {
                if !text.trim().is_empty() {
                    current_group = Some(text.trim().to_uppercase());
                    continue;
                }
            }

            let group = match &current_group {
                Some(g) => g,
                None => continue,
            };

            let product_id = sheet.cell(row, self.layout.product_id_column.get());
            let product_name = sheet.cell(row, self.layout.product_name_column.get());

            match (product_id.is_empty(), product_name.is_empty()) {
                (false, false) => {
                    let product = self.parse_data_row(sheet, row, mapping)?;
                    debug!(
                        sheet = sheet.name(),
                        row = row + 1,
                        group = %group,
                        product_id = %product.product_id,
                        "调整表数据行"
                    );
                    groups.insert(group.clone(), product);
                }
                (true, true) => {}
                _ => self.handle_malformed_row(sheet, row, group)?,
            }
        }

        Ok(groups)
    }

    fn parse_data_row(
        &self,
        sheet: &SheetTable,
        row: usize,
        mapping: &TierMapping,
    ) -> ImportResult<ProductAdjustment> {
        let mut tiers = Vec::with_capacity(self.layout.tier_columns.len());
        for (pos, col) in self.layout.tier_columns.iter().enumerate() {
            let index = pos as u32 + 1;
            let Some(code) = mapping.code_for(index) else {
                continue;
            };
            tiers.push(TierAdjustment {
                index,
                code: code.to_string(),
                value: self.number_or_zero(sheet, row, col.get())?,
            });
        }

        Ok(ProductAdjustment {
            product_id: sheet
                .cell(row, self.layout.product_id_column.get())
                .render()
                .trim()
                .to_string(),
            product_name: sheet
                .cell(row, self.layout.product_name_column.get())
                .render()
                .trim()
                .to_string(),
            base_price: self.number_or_zero(sheet, row, self.layout.base_price_column.get())?,
            tiers,
        })
    }

    /// 空白 → 0.0;数值或数值文本 → 数值;其他 → 错误
    fn number_or_zero(&self, sheet: &SheetTable, row: usize, col: usize) -> ImportResult<f64> {
        let cell = sheet.cell(row, col);
        if cell.is_empty() {
            return Ok(0.0);
        }
        match cell {
            CellValue::Number(_) | CellValue::Text(_) => cell.as_f64(),
            _ => None,
        }
        .ok_or_else(|| ImportError::NonNumericCell {
            sheet: sheet.name().to_string(),
            cell: cell_ref(row, col),
            value: cell.render(),
        })
    }

    fn handle_malformed_row(&self, sheet: &SheetTable, row: usize, group: &str) -> ImportResult<()> {
        match self.policy {
            MalformedRowPolicy::Skip => {
                warn!(
                    sheet = sheet.name(),
                    row = row + 1,
                    group = group,
                    "调整表数据行缺少产品编号或名称,已跳过"
                );
                Ok(())
            }
            MalformedRowPolicy::Reject => Err(ImportError::MalformedAdjustorRow {
                sheet: sheet.name().to_string(),
                row: row + 1,
                group: group.to_string(),
                message: "产品编号与产品名称必须同时存在".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Channel, ColumnIndex};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// 标签/编号/名称/基准价 + 12 个层级值
    fn data_row(label: CellValue, id: CellValue, name: CellValue, base: CellValue, tiers: Vec<CellValue>) -> Vec<CellValue> {
        let mut cells = vec![label, id, name, base];
        cells.extend(tiers);
        cells
    }

    fn tier_values(f: impl Fn(usize) -> f64) -> Vec<CellValue> {
        (1..=12).map(|i| CellValue::Number(f(i))).collect()
    }

    fn mapping_rows() -> Vec<Vec<CellValue>> {
        vec![
            data_row(CellValue::Empty, CellValue::Empty, CellValue::Empty, CellValue::Empty, tier_values(|i| i as f64)),
            data_row(
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                (1..=12).map(|i| text(&format!("NA{}", i))).collect(),
            ),
        ]
    }

    fn adjustor_sheet(name: &str) -> SheetTable {
        let mut rows = vec![
            data_row(text("GRID"), CellValue::Empty, CellValue::Empty, text("BASE"), (1..=12).map(|i| text(&format!("TIER {} - DEL TOTAL", i))).collect()),
            data_row(text("FullDoc "), CellValue::Empty, CellValue::Empty, CellValue::Empty, vec![]),
            data_row(CellValue::Empty, text("P1"), text("Prod1"), CellValue::Number(0.0), tier_values(|i| 0.1 * i as f64)),
            data_row(text("GRID"), CellValue::Empty, CellValue::Empty, text("BASE"), vec![]),
            data_row(text("ALTDOC"), CellValue::Empty, CellValue::Empty, CellValue::Empty, vec![]),
            data_row(CellValue::Empty, CellValue::Number(1005.0), text("Prod5"), CellValue::Number(100.5), {
                let mut t = tier_values(|_| -0.125);
                t[11] = CellValue::Empty;
                t
            }),
            data_row(text("GRID"), CellValue::Empty, CellValue::Empty, CellValue::Empty, vec![]),
            // 无产品组时的数据行被忽略
            data_row(CellValue::Empty, text("P9"), text("Orphan"), CellValue::Empty, tier_values(|_| 9.0)),
        ];
        rows.extend(mapping_rows());
        SheetTable::from_rows(name, rows)
    }

    #[test]
    fn test_fulldoc_tier_one_adjustment() {
        let layout = AdjustorLayout::default();
        let parser = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip);
        let groups = parser.parse_sheet(&adjustor_sheet("NQM DEL INPUT")).unwrap();

        let full_doc = groups.get("FULLDOC").unwrap();
        assert_eq!(full_doc.adjustment_for("NA1"), 0.1);
        assert_eq!(full_doc.product_id, "P1");
        assert_eq!(full_doc.product_name, "Prod1");
        assert_eq!(full_doc.tiers.len(), 12);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_tier_one_shares_base_column() {
        let layout = AdjustorLayout {
            tier_columns: (3..15).map(ColumnIndex).collect(),
            ..AdjustorLayout::default()
        };
        // 标签/编号/名称 + D..O 层级 (D 同时为 BASE)
        let row = |label: CellValue, id: CellValue, name: CellValue, tiers: Vec<CellValue>| {
            let mut cells = vec![label, id, name];
            cells.extend(tiers);
            cells
        };
        let sheet = SheetTable::from_rows(
            "NQM DEL INPUT",
            vec![
                row(text("GRID"), CellValue::Empty, CellValue::Empty, vec![text("BASE")]),
                row(text("FULLDOC"), CellValue::Empty, CellValue::Empty, vec![]),
                row(CellValue::Empty, text("P1"), text("Prod1"), tier_values(|i| 0.25 * i as f64)),
                row(CellValue::Empty, CellValue::Empty, CellValue::Empty, tier_values(|i| i as f64)),
                row(
                    CellValue::Empty,
                    CellValue::Empty,
                    CellValue::Empty,
                    (1..=12).map(|i| text(&format!("NA{}", i))).collect(),
                ),
            ],
        );

        let groups = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip)
            .parse_sheet(&sheet)
            .unwrap();
        let full_doc = groups.get("FULLDOC").unwrap();
        assert_eq!(full_doc.adjustment_for("NA1"), 0.25);
        assert_eq!(full_doc.base_price, 0.25);
        assert_eq!(full_doc.adjustment_for("NA12"), 3.0);
    }

    #[test]
    fn test_numeric_product_id_and_blank_tier() {
        let layout = AdjustorLayout::default();
        let parser = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip);
        let groups = parser.parse_sheet(&adjustor_sheet("NQM DEL INPUT")).unwrap();

        let alt_doc = groups.get("ALTDOC").unwrap();
        assert_eq!(alt_doc.product_id, "1005");
        assert_eq!(alt_doc.base_price, 100.5);
        assert_eq!(alt_doc.adjustment_for("NA11"), -0.125);
        assert_eq!(alt_doc.adjustment_for("NA12"), 0.0);
    }

    #[test]
    fn test_malformed_row_policy() {
        let mut rows = vec![
            data_row(text("DSCR"), CellValue::Empty, CellValue::Empty, CellValue::Empty, vec![]),
            data_row(CellValue::Empty, text("P7"), CellValue::Empty, CellValue::Empty, tier_values(|_| 0.5)),
        ];
        rows.extend(mapping_rows());
        let sheet = SheetTable::from_rows("DEL", rows);
        let layout = AdjustorLayout::default();

        let skipped = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip)
            .parse_sheet(&sheet)
            .unwrap();
        assert!(skipped.is_empty());

        match AdjustorSheetParser::new(&layout, MalformedRowPolicy::Reject).parse_sheet(&sheet) {
            Err(ImportError::MalformedAdjustorRow { row, group, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(group, "DSCR");
            }
            other => panic!("期望 MalformedAdjustorRow,实际: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_tier_cell_rejected() {
        let mut rows = vec![
            data_row(text("DSCR"), CellValue::Empty, CellValue::Empty, CellValue::Empty, vec![]),
            data_row(CellValue::Empty, text("P7"), text("Prod7"), CellValue::Empty, {
                let mut t = tier_values(|_| 0.5);
                t[2] = text("n/a");
                t
            }),
        ];
        rows.extend(mapping_rows());
        let sheet = SheetTable::from_rows("DEL", rows);
        let layout = AdjustorLayout::default();

        match AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip).parse_sheet(&sheet) {
            Err(ImportError::NonNumericCell { cell, value, .. }) => {
                assert_eq!(cell, "G2");
                assert_eq!(value, "n/a");
            }
            other => panic!("期望 NonNumericCell,实际: {:?}", other),
        }
    }

    #[test]
    fn test_missing_mapping_fails_sheet() {
        let sheet = SheetTable::from_rows("DEL", vec![vec![text("FULLDOC")]]);
        let layout = AdjustorLayout::default();
        let result = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip).parse_sheet(&sheet);
        assert!(matches!(result, Err(ImportError::MappingNotFound { found: 0, .. })));
    }

    #[test]
    fn test_workbook_channels_follow_rules() {
        use crate::config::ChannelRule;

        let workbook = WorkbookSnapshot::from_sheets(
            "adjustors.xlsx",
            vec![adjustor_sheet("NQM DEL INPUT"), adjustor_sheet("NQM NONDEL INPUT")],
        );

        // 默认规则: 两个工作表都包含 "DEL",后者覆盖前者
        let layout = AdjustorLayout::default();
        let table = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip)
            .parse_workbook(&workbook)
            .unwrap();
        assert_eq!(table.channels().collect::<Vec<_>>(), vec![Channel::Del]);

        let mut layout = AdjustorLayout::default();
        layout.channel_rules.insert(
            0,
            ChannelRule {
                pattern: "NONDEL".to_string(),
                channel: Channel::Nondel,
            },
        );
        let table = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip)
            .parse_workbook(&workbook)
            .unwrap();
        assert_eq!(
            table.channels().collect::<Vec<_>>(),
            vec![Channel::Del, Channel::Nondel]
        );
        assert_eq!(
            table.product(Channel::Nondel, "FULLDOC").map(|p| p.adjustment_for("NA1")),
            Some(0.1)
        );
    }

    #[test]
    fn test_invalid_layout_checked_before_parsing() {
        let workbook = WorkbookSnapshot::from_sheets("adjustors.xlsx", vec![adjustor_sheet("DEL")]);
        let mut layout = AdjustorLayout::default();
        layout.tier_columns.truncate(11);

        let result = AdjustorSheetParser::new(&layout, MalformedRowPolicy::Skip).parse_workbook(&workbook);
        assert!(matches!(result, Err(ImportError::Layout(_))));
    }
}
