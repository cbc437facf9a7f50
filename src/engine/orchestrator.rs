// ==========================================
// 分层利率表生成引擎 - 生成编排器
// ==========================================
// 主流程:
//   1. 校验配置,解析客户层级 CSV (仅登记,不影响生成)
//   2. 解析调整表 (整次生成只解析一次)
//   3. 构建生成计划 (渠道 × 产品 × 层级)
//   4. 每个 (渠道, 产品) 重新读取基准工作簿并定位网格
//   5. 每个层级: 调整 → 命名 → 写出 → 登记产物
// 策略: 任一错误中止,已写出的文件保留
// ==========================================

use crate::config::EngineConfig;
use crate::domain::adjustment::AdjustmentTable;
use crate::domain::artifact::OutputArtifact;
use crate::domain::customer::CustomerTier;
use crate::domain::types::Channel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::grid_adjuster::GridAdjuster;
use crate::engine::naming::OutputName;
use crate::engine::plan::{GenerationPlan, ProductPlan};
use crate::engine::sink::ArtifactSink;
use crate::engine::workbook_writer::WorkbookWriter;
use crate::importer::{
    AdjustorSheetParser, BaseGridParser, CustomerTierParser, ImportError, WorkbookSnapshot,
};
use crate::perf::PerfGuard;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ==========================================
// SourceDocuments - 一次生成的输入文件
// ==========================================

#[derive(Debug, Clone)]
pub struct SourceDocuments {
    pub customer_tiers_csv: PathBuf,
    pub adjustors_xlsx: PathBuf,
    pub del_base_xlsx: PathBuf,
    pub nondel_base_xlsx: PathBuf,
}

impl SourceDocuments {
    /// 渠道对应的基准工作簿
    pub fn base_for(&self, channel: Channel) -> &Path {
        match channel {
            Channel::Del => &self.del_base_xlsx,
            Channel::Nondel => &self.nondel_base_xlsx,
        }
    }
}

// ==========================================
// GenerationReport - 生成结果
// ==========================================

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub effective_date: NaiveDate,
    pub customers: Vec<CustomerTier>,
    pub adjustments: AdjustmentTable,
    /// 按生成顺序
    pub artifacts: Vec<OutputArtifact>,
    /// 使用了兜底层级的 (渠道, 产品)
    pub default_tier_products: Vec<(Channel, String)>,
}

// ==========================================
// GenerationOrchestrator - 生成编排器
// ==========================================

pub struct GenerationOrchestrator {
    config: EngineConfig,
}

impl GenerationOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 解析调整表
    pub fn load_adjustments(&self, adjustors_xlsx: &Path) -> EngineResult<AdjustmentTable> {
        AdjustorSheetParser::new(&self.config.adjustor_layout, self.config.malformed_row_policy)
            .load(adjustors_xlsx)
            .map_err(|source| EngineError::Adjustors {
                path: adjustors_xlsx.display().to_string(),
                source,
            })
    }

    /// 执行一次完整生成
    ///
    /// # 参数
    /// - sources: 输入文件
    /// - effective_date: 生效日 (决定输出目录与文件名)
    /// - sink: 产物登记者,每写出一个工作簿登记一次
    ///
    /// # 返回
    /// 生成结果; 任一错误中止整次生成
    pub fn generate(
        &self,
        sources: &SourceDocuments,
        effective_date: NaiveDate,
        sink: &mut dyn ArtifactSink,
    ) -> EngineResult<GenerationReport> {
        let _perf = PerfGuard::new("generate");
        self.config.validate()?;

        info!(
            investor = %self.config.investor_code,
            effective_date = %effective_date,
            storage_root = %self.config.storage_root.display(),
            "开始生成分层利率表"
        );

        // ==========================================
        // 步骤1: 客户层级
        // ==========================================
        let customers = CustomerTierParser
            .parse(&sources.customer_tiers_csv)
            .map_err(|source| EngineError::CustomerTiers {
                path: sources.customer_tiers_csv.display().to_string(),
                source,
            })?;
        info!(customers = customers.len(), "客户层级解析完成");

        // ==========================================
        // 步骤2: 调整表
        // ==========================================
        let adjustments = self.load_adjustments(&sources.adjustors_xlsx)?;
        info!(
            channels = adjustments.channels().count(),
            tier_codes = adjustments.tier_codes().len(),
            "调整表解析完成"
        );

        // ==========================================
        // 步骤3: 生成计划
        // ==========================================
        let plan = GenerationPlan::build(&self.config, &adjustments);
        info!(
            products = plan.products().len(),
            workbooks = plan.len(),
            "生成计划已构建"
        );

        // ==========================================
        // 步骤4-5: 逐产品、逐层级写出
        // ==========================================
        let mut artifacts = Vec::with_capacity(plan.len());
        let mut default_tier_products = Vec::new();

        for product_plan in plan.products() {
            if product_plan.default_tiers {
                default_tier_products
                    .push((product_plan.channel, product_plan.product.code.clone()));
            }
            let written =
                self.generate_product(sources, product_plan, effective_date, sink)?;
            artifacts.extend(written);
        }

        sink.finish()?;

        info!(artifacts = artifacts.len(), "分层利率表生成完成");
        if !default_tier_products.is_empty() {
            warn!(
                products = ?default_tier_products,
                "部分产品使用了兜底层级"
            );
        }

        Ok(GenerationReport {
            effective_date,
            customers,
            adjustments,
            artifacts,
            default_tier_products,
        })
    }

    fn generate_product(
        &self,
        sources: &SourceDocuments,
        product_plan: &ProductPlan,
        effective_date: NaiveDate,
        sink: &mut dyn ArtifactSink,
    ) -> EngineResult<Vec<OutputArtifact>> {
        let channel = product_plan.channel;
        let product = &product_plan.product;
        let context = |source: ImportError| EngineError::BaseGrid {
            channel,
            product: product.code.clone(),
            sheet: product.sheet_name.clone(),
            source,
        };

        let base_path = sources.base_for(channel);
        let workbook = WorkbookSnapshot::load(base_path).map_err(context)?;
        let base_grid = BaseGridParser::new(&self.config.base_grid_layout)
            .parse(&workbook, &product.sheet_name)
            .map_err(context)?;

        debug!(
            channel = %channel,
            product = %product.code,
            sheet = %product.sheet_name,
            rows = base_grid.rows.len(),
            price_columns = base_grid.location.price_columns.len(),
            "基准网格定位完成"
        );

        let writer = WorkbookWriter::new(&self.config.base_grid_layout, effective_date);
        let mut artifacts = Vec::with_capacity(product_plan.tiers.len());

        for tier in &product_plan.tiers {
            let adjusted = GridAdjuster::adjust(&base_grid, tier.adjustment);

            let name = OutputName {
                investor: &self.config.investor_code,
                channel,
                product: &product.code,
                tier: &tier.code,
                effective_date,
            };
            let output_path = name.path(&self.config.storage_root);
            let annotation = format!("Channel: {} Tier: {}", channel, tier.code);

            writer.write(&workbook, &adjusted, Some(annotation.as_str()), &output_path)?;

            let artifact = OutputArtifact {
                channel,
                product_code: product.code.clone(),
                tier_code: tier.code.clone(),
                effective_date,
                adjustment_value: tier.adjustment,
                generated_filename: name.filename(),
                generated_path: output_path,
            };
            sink.record(&artifact)?;

            info!(
                channel = %channel,
                product = %product.code,
                tier = %tier.code,
                adjustment = tier.adjustment,
                path = %artifact.generated_path.display(),
                "分层利率表已写出"
            );
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }
}
