// ==========================================
// 分层利率表生成引擎 - 基准价格网格解析器
// ==========================================
// 锚点: "Note Rate" 哨兵单元格 (逐列自上而下扫描,首个命中生效)
// 价格列: 表头下一格为数值,或整列非空单元格均为数值
// 数据行: 表头下一行起,直到所有价格列均为空的一行 (不含)
// ==========================================

use crate::config::BaseGridLayout;
use crate::domain::grid::{GridLocation, GridRow, PriceColumn, PriceGrid};
use crate::domain::types::{CellValue, ColumnIndex};
use crate::importer::error::{cell_ref, ImportError, ImportResult};
use crate::importer::sheet::{SheetTable, WorkbookSnapshot};
use std::path::Path;
use tracing::debug;

pub struct BaseGridParser<'a> {
    layout: &'a BaseGridLayout,
}

impl<'a> BaseGridParser<'a> {
    pub fn new(layout: &'a BaseGridLayout) -> Self {
        Self { layout }
    }

    /// 读取基准工作簿并解析指定产品工作表
    pub fn load<P: AsRef<Path>>(&self, file_path: P, sheet_name: &str) -> ImportResult<PriceGrid> {
        let workbook = WorkbookSnapshot::load(file_path)?;
        self.parse(&workbook, sheet_name)
    }

    pub fn parse(&self, workbook: &WorkbookSnapshot, sheet_name: &str) -> ImportResult<PriceGrid> {
        self.layout.validate()?;
        let sheet = workbook.sheet(sheet_name)?;
        self.parse_sheet(sheet, &workbook.path().display().to_string())
    }

    /// 解析单个工作表
    ///
    /// # 参数
    /// - workbook_label: 错误信息中使用的工作簿标识
    pub fn parse_sheet(&self, sheet: &SheetTable, workbook_label: &str) -> ImportResult<PriceGrid> {
        let (header_row, note_col) =
            self.locate_header(sheet)
                .ok_or_else(|| ImportError::GridHeaderNotFound {
                    workbook: workbook_label.to_string(),
                    sheet: sheet.name().to_string(),
                    sentinel: self.layout.sentinel.clone(),
                })?;

        let first_data_row = header_row + 1;
        let price_columns = self.detect_price_columns(sheet, header_row, note_col);

        let mut rows = Vec::new();
        let mut row = first_data_row;
        while row < sheet.height() {
            let all_empty = price_columns
                .iter()
                .all(|c| sheet.cell(row, c.index.get()).is_empty());
            if all_empty {
                break;
            }

            let note_rate = self.optional_number(sheet, row, note_col)?;
            let prices = price_columns
                .iter()
                .map(|c| self.optional_number(sheet, row, c.index.get()))
                .collect::<ImportResult<Vec<_>>>()?;
            rows.push(GridRow { note_rate, prices });
            row += 1;
        }

        let location = GridLocation {
            sheet_name: sheet.name().to_string(),
            header_row: header_row as u32,
            note_rate_column: ColumnIndex(note_col as u16),
            note_rate_label: self.layout.sentinel.clone(),
            first_data_row: first_data_row as u32,
            end_row: (first_data_row + rows.len()) as u32,
            price_columns,
        };

        debug!(
            sheet = sheet.name(),
            header = %cell_ref(header_row, note_col),
            rows = rows.len(),
            price_columns = location.price_columns.len(),
            "基准网格解析完成"
        );

        Ok(PriceGrid { location, rows })
    }

    /// 列优先扫描哨兵文本
    fn locate_header(&self, sheet: &SheetTable) -> Option<(usize, usize)> {
        (0..sheet.width()).find_map(|col| {
            (0..sheet.height())
                .find(|&row| sheet.cell(row, col).as_text() == Some(self.layout.sentinel.as_str()))
                .map(|row| (row, col))
        })
    }

    fn detect_price_columns(
        &self,
        sheet: &SheetTable,
        header_row: usize,
        note_col: usize,
    ) -> Vec<PriceColumn> {
        (0..sheet.width())
            .filter(|&col| col != note_col)
            .filter(|&col| {
                sheet.cell(header_row + 1, col).is_numeric() || Self::is_numeric_column(sheet, col)
            })
            .map(|col| {
                let index = ColumnIndex(col as u16);
                let header = sheet.cell(header_row, col).render().trim().to_string();
                PriceColumn {
                    index,
                    label: if header.is_empty() { index.letter() } else { header },
                }
            })
            .collect()
    }

    /// 至少一个非空单元格且全部非空单元格为数值
    fn is_numeric_column(sheet: &SheetTable, col: usize) -> bool {
        let mut seen = false;
        for row in 0..sheet.height() {
            let cell = sheet.cell(row, col);
            if cell.is_empty() {
                continue;
            }
            if !cell.is_numeric() {
                return false;
            }
            seen = true;
        }
        seen
    }

    fn optional_number(&self, sheet: &SheetTable, row: usize, col: usize) -> ImportResult<Option<f64>> {
        let cell = sheet.cell(row, col);
        match cell {
            CellValue::Empty => Ok(None),
            CellValue::Number(v) => Ok(Some(*v)),
            CellValue::Text(s) if s.trim().is_empty() => Ok(None),
            other => other.as_f64().map(Some).ok_or_else(|| ImportError::NonNumericCell {
                sheet: sheet.name().to_string(),
                cell: cell_ref(row, col),
                value: other.render(),
            }),
        }
    }
}
