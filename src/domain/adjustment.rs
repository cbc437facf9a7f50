// ==========================================
// 分层利率表生成引擎 - 调整表
// ==========================================
// 结构: 渠道 → 产品组代码 → ProductAdjustment
// ==========================================

use crate::domain::tier::numeric_index_of;
use crate::domain::types::Channel;
use serde::Serialize;
use std::collections::BTreeMap;

/// 单个层级的价格调整
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAdjustment {
    pub index: u32,
    pub code: String,
    pub value: f64,
}

/// 产品组调整项 (来自调整表数据行)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAdjustment {
    pub product_id: String,
    pub product_name: String,
    pub base_price: f64,
    /// 按数字序号升序
    pub tiers: Vec<TierAdjustment>,
}

impl ProductAdjustment {
    /// 层级调整值,缺失时为 0.0
    pub fn adjustment_for(&self, tier_code: &str) -> f64 {
        self.tiers
            .iter()
            .find(|t| t.code == tier_code)
            .map(|t| t.value)
            .unwrap_or(0.0)
    }

    pub fn tier_codes(&self) -> impl Iterator<Item = &str> {
        self.tiers.iter().map(|t| t.code.as_str())
    }
}

/// 单渠道调整项: 产品组代码 → 调整项
pub type ChannelAdjustments = BTreeMap<String, ProductAdjustment>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdjustmentTable {
    channels: BTreeMap<Channel, ChannelAdjustments>,
}

impl AdjustmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入整张渠道表 (同渠道重复时后者覆盖前者)
    ///
    /// # 返回
    /// - true: 覆盖了已有渠道
    pub fn insert_channel(&mut self, channel: Channel, adjustments: ChannelAdjustments) -> bool {
        self.channels.insert(channel, adjustments).is_some()
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelAdjustments> {
        self.channels.get(&channel)
    }

    pub fn product(&self, channel: Channel, product_code: &str) -> Option<&ProductAdjustment> {
        self.channels.get(&channel)?.get(product_code)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    /// 表中出现的全部层级代码及其推导序号 (供下游层级登记)
    ///
    /// 序号由代码推导 ("NA7" → 7),代码不含序号时取列位置序号
    pub fn tier_codes(&self) -> BTreeMap<String, u32> {
        self.channels
            .values()
            .flat_map(|products| products.values())
            .flat_map(|product| product.tiers.iter())
            .map(|t| (t.code.clone(), numeric_index_of(&t.code).unwrap_or(t.index)))
            .collect()
    }
}
