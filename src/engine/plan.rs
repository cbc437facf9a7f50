// ==========================================
// 分层利率表生成引擎 - 生成计划
// ==========================================
// 职责: 渠道 × 产品 × 层级 的笛卡尔积,逐格可枚举
// 规则: 只包含调整表中出现且已配置的产品
//       产品无层级调整时使用兜底层级 (调整值 0.0)
// ==========================================

use crate::config::{EngineConfig, ProductSpec};
use crate::domain::adjustment::AdjustmentTable;
use crate::domain::types::Channel;
use tracing::warn;

/// 计划中的单个层级
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTier {
    pub code: String,
    pub adjustment: f64,
}

/// 单个 (渠道, 产品) 的生成任务,共享同一张基准网格
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPlan {
    pub channel: Channel,
    pub product: ProductSpec,
    pub tiers: Vec<PlannedTier>,
    /// 是否使用了兜底层级
    pub default_tiers: bool,
}

/// 计划中的单个输出单元
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCell<'a> {
    pub channel: Channel,
    pub product_code: &'a str,
    pub sheet_name: &'a str,
    pub tier_code: &'a str,
    pub adjustment: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationPlan {
    products: Vec<ProductPlan>,
}

impl GenerationPlan {
    pub fn build(config: &EngineConfig, table: &AdjustmentTable) -> Self {
        let mut products = Vec::new();

        for &channel in &config.channels {
            let Some(adjustments) = table.channel(channel) else {
                warn!(channel = %channel, "调整表中没有该渠道,跳过");
                continue;
            };

            for group in adjustments.keys() {
                if config.product(group).is_none() {
                    warn!(channel = %channel, product = %group, "产品组未配置基准工作表,跳过");
                }
            }

            for spec in &config.products {
                let Some(adjustment) = adjustments
                    .iter()
                    .find(|(group, _)| group.eq_ignore_ascii_case(&spec.code))
                    .map(|(_, adjustment)| adjustment)
                else {
                    continue;
                };

                let (tiers, default_tiers) = if adjustment.tiers.is_empty() {
                    warn!(
                        channel = %channel,
                        product = %spec.code,
                        "产品无层级调整,使用兜底层级 (调整值 0.0)"
                    );
                    let tiers = config
                        .default_tier_codes
                        .iter()
                        .map(|code| PlannedTier {
                            code: code.clone(),
                            adjustment: 0.0,
                        })
                        .collect();
                    (tiers, true)
                } else {
                    let tiers = adjustment
                        .tiers
                        .iter()
                        .map(|t| PlannedTier {
                            code: t.code.clone(),
                            adjustment: t.value,
                        })
                        .collect();
                    (tiers, false)
                };

                products.push(ProductPlan {
                    channel,
                    product: spec.clone(),
                    tiers,
                    default_tiers,
                });
            }
        }

        Self { products }
    }

    pub fn products(&self) -> &[ProductPlan] {
        &self.products
    }

    /// 逐格枚举 (渠道 → 产品 → 层级)
    pub fn cells(&self) -> impl Iterator<Item = GenerationCell<'_>> {
        self.products.iter().flat_map(|plan| {
            plan.tiers.iter().map(move |tier| GenerationCell {
                channel: plan.channel,
                product_code: &plan.product.code,
                sheet_name: &plan.product.sheet_name,
                tier_code: &tier.code,
                adjustment: tier.adjustment,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.products.iter().map(|p| p.tiers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adjustment::{ChannelAdjustments, ProductAdjustment, TierAdjustment};

    fn product(tiers: &[(&str, f64)]) -> ProductAdjustment {
        ProductAdjustment {
            product_id: "1001".to_string(),
            product_name: "Prod".to_string(),
            base_price: 100.0,
            tiers: tiers
                .iter()
                .enumerate()
                .map(|(i, (code, value))| TierAdjustment {
                    index: i as u32 + 1,
                    code: code.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    fn table() -> AdjustmentTable {
        let mut del = ChannelAdjustments::new();
        del.insert("FULLDOC".to_string(), product(&[("NA1", 0.1), ("NA2", 0.2)]));
        del.insert("DSCR".to_string(), product(&[]));
        del.insert("HELOC".to_string(), product(&[("NA1", 0.5)]));

        let mut nondel = ChannelAdjustments::new();
        nondel.insert("ALTDOC".to_string(), product(&[("NA3", -0.25)]));

        let mut table = AdjustmentTable::new();
        table.insert_channel(Channel::Del, del);
        table.insert_channel(Channel::Nondel, nondel);
        table
    }

    #[test]
    fn test_cells_follow_config_order() {
        let plan = GenerationPlan::build(&EngineConfig::default(), &table());

        let cells: Vec<(Channel, &str, &str, f64)> = plan
            .cells()
            .map(|c| (c.channel, c.product_code, c.tier_code, c.adjustment))
            .collect();

        assert_eq!(cells[0], (Channel::Del, "FULLDOC", "NA1", 0.1));
        assert_eq!(cells[1], (Channel::Del, "FULLDOC", "NA2", 0.2));
        assert_eq!(cells[2], (Channel::Del, "DSCR", "NA1", 0.0));
        assert_eq!(cells.last(), Some(&(Channel::Nondel, "ALTDOC", "NA3", -0.25)));
        // FULLDOC 2 + DSCR 兜底 12 + ALTDOC 1
        assert_eq!(plan.len(), 15);
    }

    #[test]
    fn test_unconfigured_group_skipped() {
        let plan = GenerationPlan::build(&EngineConfig::default(), &table());
        assert!(plan.cells().all(|c| c.product_code != "HELOC"));
    }

    #[test]
    fn test_default_tiers_flagged() {
        let plan = GenerationPlan::build(&EngineConfig::default(), &table());
        let dscr = plan
            .products()
            .iter()
            .find(|p| p.product.code == "DSCR")
            .unwrap();
        assert!(dscr.default_tiers);
        assert_eq!(dscr.tiers.len(), 12);
        assert_eq!(dscr.tiers[11].code, "NA12");
        assert_eq!(dscr.product.sheet_name, "PHH - DSCR");
    }

    #[test]
    fn test_missing_channel_yields_nothing() {
        let mut del = ChannelAdjustments::new();
        del.insert("FULLDOC".to_string(), product(&[("NA1", 0.1)]));
        let mut table = AdjustmentTable::new();
        table.insert_channel(Channel::Del, del);

        let plan = GenerationPlan::build(&EngineConfig::default(), &table);
        assert_eq!(plan.len(), 1);
        assert!(plan.cells().all(|c| c.channel == Channel::Del));
    }
}
