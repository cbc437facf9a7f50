// ==========================================
// 分层利率表生成引擎 - 版式契约
// ==========================================
// 职责: 把哨兵文本与按位置寻址的列固定为显式、可校验的契约
// 时机: 加载时校验一次,之后解析器只读列索引
// ==========================================

use crate::config::error::LayoutError;
use crate::domain::tier::TIER_COUNT;
use crate::domain::types::{Channel, ColumnIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// ChannelRule - 工作表名 → 渠道
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRule {
    /// 工作表名包含的子串 (不区分大小写)
    pub pattern: String,
    pub channel: Channel,
}

// ==========================================
// AdjustorLayout - 调整表版式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustorLayout {
    /// 产品组标签列
    pub label_column: ColumnIndex,
    pub product_id_column: ColumnIndex,
    pub product_name_column: ColumnIndex,
    pub base_price_column: ColumnIndex,
    /// 12 个层级列,位置顺序即数字序号 1..=12
    pub tier_columns: Vec<ColumnIndex>,
    /// 产品组结束标记
    pub group_reset_sentinel: String,
    /// 按顺序匹配,首个命中生效
    pub channel_rules: Vec<ChannelRule>,
    pub fallback_channel: Channel,
}

impl Default for AdjustorLayout {
    fn default() -> Self {
        Self {
            label_column: ColumnIndex(0),
            product_id_column: ColumnIndex(1),
            product_name_column: ColumnIndex(2),
            base_price_column: ColumnIndex(3),
            tier_columns: (4..4 + TIER_COUNT as u16).map(ColumnIndex).collect(),
            group_reset_sentinel: "GRID".to_string(),
            channel_rules: vec![ChannelRule {
                pattern: "DEL".to_string(),
                channel: Channel::Del,
            }],
            fallback_channel: Channel::Nondel,
        }
    }
}

impl AdjustorLayout {
    /// 校验版式契约
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.tier_columns.len() != TIER_COUNT {
            return Err(LayoutError::TierColumnCount {
                expected: TIER_COUNT,
                found: self.tier_columns.len(),
            });
        }

        if self.group_reset_sentinel.trim().is_empty() {
            return Err(LayoutError::EmptySentinel("group_reset_sentinel".to_string()));
        }

        // 基准价列允许与某个层级列重合 (D 列同时承载 BASE 与层级 1 的版式)
        let mut roles: Vec<(ColumnIndex, String)> = vec![
            (self.label_column, "标签列".to_string()),
            (self.product_id_column, "产品编号列".to_string()),
            (self.product_name_column, "产品名称列".to_string()),
        ];
        for (pos, column) in self.tier_columns.iter().enumerate() {
            roles.push((*column, format!("层级列 {}", pos + 1)));
        }

        let mut seen: HashMap<ColumnIndex, String> = HashMap::new();
        for (column, role) in roles {
            if let Some(first) = seen.get(&column) {
                return Err(LayoutError::ColumnOverlap {
                    column,
                    first: first.clone(),
                    second: role,
                });
            }
            seen.insert(column, role);
        }

        for (column, role) in [
            (self.label_column, "标签列"),
            (self.product_id_column, "产品编号列"),
            (self.product_name_column, "产品名称列"),
        ] {
            if column == self.base_price_column {
                return Err(LayoutError::ColumnOverlap {
                    column,
                    first: role.to_string(),
                    second: "基准价列".to_string(),
                });
            }
        }

        for (pos, rule) in self.channel_rules.iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                return Err(LayoutError::EmptyChannelRule(pos + 1));
            }
        }

        Ok(())
    }

    /// 工作表名 → 渠道 (首个命中规则生效,否则回落)
    pub fn channel_for_sheet(&self, sheet_name: &str) -> Channel {
        let upper = sheet_name.to_uppercase();
        self.channel_rules
            .iter()
            .find(|rule| upper.contains(&rule.pattern.to_uppercase()))
            .map(|rule| rule.channel)
            .unwrap_or(self.fallback_channel)
    }
}

// ==========================================
// BaseGridLayout - 基准价格表版式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseGridLayout {
    /// 网格锚点文本
    pub sentinel: String,
    /// 注释写入行 (列为已用区域之后的第一列)
    pub annotation_row: u32,
    /// 注释列标题,写在注释单元格上一行;为空或注释位于首行时不写
    pub annotation_label: String,
}

impl Default for BaseGridLayout {
    fn default() -> Self {
        Self {
            sentinel: "Note Rate".to_string(),
            annotation_row: 1,
            annotation_label: "Generated Info".to_string(),
        }
    }
}

impl BaseGridLayout {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.sentinel.trim().is_empty() {
            return Err(LayoutError::EmptySentinel("sentinel".to_string()));
        }
        Ok(())
    }

    /// 注释列标题所在行
    pub fn annotation_label_row(&self) -> Option<u32> {
        if self.annotation_label.trim().is_empty() {
            return None;
        }
        self.annotation_row.checked_sub(1)
    }
}
