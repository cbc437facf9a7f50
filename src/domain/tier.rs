// ==========================================
// 分层利率表生成引擎 - 层级映射
// ==========================================
// 职责: 数字序号 (1..=12) ↔ 层级代码 (如 "NA7") 双向映射
// 约束: 双向单射,每个渠道工作表单独构建
// ==========================================

use serde::Serialize;
use std::collections::BTreeMap;

/// 层级数量 (固定 12 列)
pub const TIER_COUNT: usize = 12;

/// 默认层级代码 NA1..NA12 (无调整项时的兜底列表)
pub fn default_tier_codes() -> Vec<String> {
    (1..=TIER_COUNT).map(|i| format!("NA{}", i)).collect()
}

/// 由层级代码推导数字序号 ("NA7" → 7)
pub fn numeric_index_of(code: &str) -> Option<u32> {
    code.trim()
        .strip_prefix("NA")
        .and_then(|rest| rest.parse::<u32>().ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierMapping {
    index_to_code: BTreeMap<u32, String>,
    code_to_index: BTreeMap<String, u32>,
}

impl TierMapping {
    /// 按列位置成对构建映射
    ///
    /// # 返回
    /// - Ok: 映射
    /// - Err((index, code)): 第一个冲突的序号或代码
    pub fn from_pairs<I>(pairs: I) -> Result<Self, (u32, String)>
    where
        I: IntoIterator<Item = (u32, String)>,
    {
        let mut mapping = TierMapping::default();
        for (index, code) in pairs {
            if mapping.index_to_code.contains_key(&index) || mapping.code_to_index.contains_key(&code)
            {
                return Err((index, code));
            }
            mapping.index_to_code.insert(index, code.clone());
            mapping.code_to_index.insert(code, index);
        }
        Ok(mapping)
    }

    pub fn code_for(&self, index: u32) -> Option<&str> {
        self.index_to_code.get(&index).map(String::as_str)
    }

    pub fn index_for(&self, code: &str) -> Option<u32> {
        self.code_to_index.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.index_to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_code.is_empty()
    }

    /// 按序号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.index_to_code.iter().map(|(i, c)| (*i, c.as_str()))
    }
}
