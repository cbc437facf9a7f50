// ==========================================
// 分层利率表生成引擎 - 工作簿写出器
// ==========================================
// 写出: rust_xlsxwriter
// 规则: 目标工作表只改写网格区域 (票面利率列 + 价格列的数据行)
//       其余单元格与其他工作表按原值复制
//       注释写入单个单元格: 注释行 × 已用区域之后第一列,上一行写列标题
// 约束: 源文件只读;文档创建时间固定为生效日,重复生成字节一致
// 限制: 按值重建,不保留样式、列宽与数字格式;日期统一为 DATETIME_NUM_FORMAT
// ==========================================

use crate::config::BaseGridLayout;
use crate::domain::grid::PriceGrid;
use crate::domain::types::CellValue;
use crate::engine::error::{EngineError, EngineResult};
use crate::importer::{SheetTable, WorkbookSnapshot};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 日期单元格的写出格式
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub struct WorkbookWriter<'a> {
    layout: &'a BaseGridLayout,
    creation_date: NaiveDate,
}

impl<'a> WorkbookWriter<'a> {
    /// # 参数
    /// - creation_date: 写入文档属性的创建日期 (通常为生效日)
    pub fn new(layout: &'a BaseGridLayout, creation_date: NaiveDate) -> Self {
        Self {
            layout,
            creation_date,
        }
    }

    /// 以源工作簿为底稿写出调整后的网格
    ///
    /// # 参数
    /// - source: 源工作簿 (网格所在工作表由 grid.location 指定)
    /// - grid: 调整后的网格
    /// - annotation: 可选注释文本
    /// - output: 输出路径 (父目录自动创建,已存在则覆盖)
    pub fn write(
        &self,
        source: &WorkbookSnapshot,
        grid: &PriceGrid,
        annotation: Option<&str>,
        output: &Path,
    ) -> EngineResult<()> {
        let target = source.sheet(&grid.location.sheet_name)?;
        let write_err = |e: XlsxError| EngineError::Write {
            path: output.display().to_string(),
            message: e.to_string(),
        };

        let mut workbook = Workbook::new();
        let created = ExcelDateTime::from_ymd(
            self.creation_date.year() as u16,
            self.creation_date.month() as u8,
            self.creation_date.day() as u8,
        )
        .map_err(write_err)?;
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

        let date_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for sheet in source.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name()).map_err(write_err)?;

            if sheet.name() == target.name() {
                self.write_target_sheet(worksheet, sheet, grid, annotation, &date_format)
                    .map_err(write_err)?;
            } else {
                for (row, col, value) in sheet.used_cells() {
                    write_cell(worksheet, row as u32, col as u16, value, &date_format)
                        .map_err(write_err)?;
                }
            }
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        workbook.save(output).map_err(write_err)?;
        crate::perf::record_workbook_write();

        debug!(
            output = %output.display(),
            sheet = target.name(),
            rows = grid.rows.len(),
            "工作簿写出完成"
        );
        Ok(())
    }

    fn write_target_sheet(
        &self,
        worksheet: &mut Worksheet,
        sheet: &SheetTable,
        grid: &PriceGrid,
        annotation: Option<&str>,
        date_format: &Format,
    ) -> Result<(), XlsxError> {
        let overrides = grid_cells(grid);

        for (row, col, value) in sheet.used_cells() {
            if overrides.contains_key(&(row as u32, col as u16)) {
                continue;
            }
            write_cell(worksheet, row as u32, col as u16, value, date_format)?;
        }

        for ((row, col), value) in &overrides {
            if let Some(v) = value {
                worksheet.write_number(*row, *col, *v)?;
            }
        }

        if let Some(text) = annotation {
            let column = sheet.width() as u16;
            if let Some(label_row) = self.layout.annotation_label_row() {
                worksheet.write_string(label_row, column, &self.layout.annotation_label)?;
            }
            worksheet.write_string(self.layout.annotation_row, column, text)?;
        }
        Ok(())
    }
}

/// 网格区域内每个单元格的新值 (None = 空)
fn grid_cells(grid: &PriceGrid) -> BTreeMap<(u32, u16), Option<f64>> {
    let location = &grid.location;
    let mut cells = BTreeMap::new();
    for (i, row) in grid.rows.iter().enumerate() {
        let sheet_row = location.sheet_row(i);
        cells.insert((sheet_row, location.note_rate_column.0), row.note_rate);
        for (column, price) in location.price_columns.iter().zip(row.prices.iter()) {
            cells.insert((sheet_row, column.index.0), *price);
        }
    }
    cells
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    match value {
        CellValue::Empty => {}
        CellValue::Number(v) => {
            worksheet.write_number(row, col, *v)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(serial) => {
            worksheet.write_number_with_format(row, col, *serial, date_format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::BaseGridParser;
    use tempfile::TempDir;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn source_workbook() -> WorkbookSnapshot {
        WorkbookSnapshot::from_sheets(
            "base.xlsx",
            vec![
                SheetTable::from_rows(
                    "PHH - FullDoc",
                    vec![
                        vec![text("Rate Sheet"), CellValue::Empty, CellValue::Empty],
                        vec![text("Note Rate"), text("15 Yr"), text("Notes")],
                        vec![CellValue::Number(3.0), CellValue::Number(99.0), text("keep")],
                        vec![CellValue::Number(3.125), CellValue::Number(99.5), CellValue::Bool(true)],
                    ],
                ),
                SheetTable::from_rows(
                    "Cover",
                    vec![vec![text("Effective"), CellValue::DateTime(45306.0)]],
                ),
            ],
        )
    }

    #[test]
    fn test_write_then_reload() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested").join("out.xlsx");
        let source = source_workbook();
        let layout = BaseGridLayout::default();

        let grid = BaseGridParser::new(&layout)
            .parse(&source, "PHH - FullDoc")
            .unwrap();
        let adjusted = crate::engine::GridAdjuster::adjust(&grid, 0.25);

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        WorkbookWriter::new(&layout, date)
            .write(&source, &adjusted, Some("Channel: DEL Tier: NA1"), &output)
            .unwrap();

        let written = WorkbookSnapshot::load(&output).unwrap();
        assert_eq!(written.sheet_names(), vec!["PHH - FullDoc", "Cover"]);

        let sheet = written.sheet("PHH - FullDoc").unwrap();
        assert_eq!(sheet.cell(2, 1), &CellValue::Number(99.25));
        assert_eq!(sheet.cell(3, 1), &CellValue::Number(99.75));
        assert_eq!(sheet.cell(2, 0), &CellValue::Number(3.0));
        assert_eq!(sheet.cell(1, 0), &text("Note Rate"));
        assert_eq!(sheet.cell(2, 2), &text("keep"));
        assert_eq!(sheet.cell(3, 2), &CellValue::Bool(true));
        // 注释列: 首行为列标题,下一行为注释
        assert_eq!(sheet.cell(0, 3), &text("Generated Info"));
        assert_eq!(sheet.cell(1, 3), &text("Channel: DEL Tier: NA1"));
        assert_eq!(sheet.width(), 4);

        assert_eq!(written.sheet("Cover").unwrap(), source.sheet("Cover").unwrap());
    }

    #[test]
    fn test_missing_target_sheet() {
        let dir = TempDir::new().unwrap();
        let source = source_workbook();
        let layout = BaseGridLayout::default();
        let mut grid = BaseGridParser::new(&layout)
            .parse(&source, "PHH - FullDoc")
            .unwrap();
        grid.location.sheet_name = "PHH - DSCR".to_string();

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let result = WorkbookWriter::new(&layout, date).write(&source, &grid, None, &dir.path().join("x.xlsx"));
        assert!(matches!(result, Err(EngineError::Import(_))));
        assert!(!dir.path().join("x.xlsx").exists());
    }
}
