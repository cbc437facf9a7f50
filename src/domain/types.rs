// ==========================================
// 分层利率表生成引擎 - 领域类型定义
// ==========================================
// 职责: 渠道、单元格值、列索引等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 渠道 (Channel)
// ==========================================
// DEL / NONDEL 两个贷款池独立定价
// 序列化格式: 大写文本 (与文件名一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Del,    // 逾期池
    Nondel, // 非逾期池
}

impl Channel {
    /// 标准生成顺序
    pub const ALL: [Channel; 2] = [Channel::Del, Channel::Nondel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Del => "DEL",
            Channel::Nondel => "NONDEL",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEL" => Ok(Channel::Del),
            "NONDEL" | "ND" => Ok(Channel::Nondel),
            other => Err(format!("未知渠道: {}", other)),
        }
    }
}

// ==========================================
// 列索引 (ColumnIndex)
// ==========================================
// 零基列号,展示为 Excel 列字母 (0 → A, 26 → AA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnIndex(pub u16);

impl ColumnIndex {
    pub fn new(index: u16) -> Self {
        ColumnIndex(index)
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }

    /// Excel 列字母
    pub fn letter(&self) -> String {
        let mut n = self.0 as u32 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ==========================================
// 单元格值 (CellValue)
// ==========================================
// 整数与浮点统一为 Number;错误单元格视为空
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(f64), // Excel 序列日期
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 数值读取: 数字直接返回,数字文本解析,其余返回 None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// 文本呈现 (整数值浮点不带小数位)
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(v) | CellValue::DateTime(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string().to_uppercase(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
