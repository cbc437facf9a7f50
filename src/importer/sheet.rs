// ==========================================
// 分层利率表生成引擎 - 工作簿内存模型
// ==========================================
// 读取: calamine (.xlsx)
// 坐标: 绝对零基行列,A1 = (0, 0);区域起点之前以空单元格补齐
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::{Path, PathBuf};
use tracing::debug;

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// SheetTable - 单个工作表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    name: String,
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl SheetTable {
    /// 由行数据构建 (行长度可不一致)
    pub fn from_rows<S: Into<String>>(name: S, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// 越界返回空单元格
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 非空单元格 (行, 列, 值),行优先
    pub fn used_cells(&self) -> impl Iterator<Item = (usize, usize, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(move |(c, v)| (r, c, v))
        })
    }

    /// 从 calamine 区域转换
    fn from_range(name: &str, range: &calamine::Range<Data>) -> Self {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
        for source_row in range.rows() {
            let mut row = vec![CellValue::Empty; col_offset];
            row.extend(source_row.iter().map(convert_cell));
            rows.push(row);
        }

        // 去掉尾部空行,保持与写出后的已用区域一致
        while rows.last().map_or(false, |r| r.iter().all(CellValue::is_empty)) {
            rows.pop();
        }

        Self::from_rows(name, rows)
    }
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ==========================================
// WorkbookSnapshot - 整个工作簿 (工作表按原顺序)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSnapshot {
    path: PathBuf,
    sheets: Vec<SheetTable>,
}

impl WorkbookSnapshot {
    /// 读取 .xlsx 工作簿的全部工作表
    pub fn load<P: AsRef<Path>>(file_path: P) -> ImportResult<Self> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            sheets.push(SheetTable::from_range(&sheet_name, &range));
        }

        crate::perf::record_workbook_read();
        debug!(path = %path.display(), sheets = sheets.len(), "工作簿读取完成");

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// 由内存中的工作表构建 (不经过文件)
    pub fn from_sheets<P: Into<PathBuf>>(path: P, sheets: Vec<SheetTable>) -> Self {
        Self {
            path: path.into(),
            sheets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheets(&self) -> &[SheetTable] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name()).collect()
    }

    pub fn sheet(&self, name: &str) -> ImportResult<&SheetTable> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ImportError::SheetNotFound {
                workbook: self.path.display().to_string(),
                sheet: name.to_string(),
            })
    }
}
