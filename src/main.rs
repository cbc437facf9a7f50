// ==========================================
// 分层利率表生成引擎 - 命令行入口
// ==========================================
// 子命令:
//   generate  生成全部渠道/产品/层级的利率表
//   inspect   打印解析后的调整表 (JSON)
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ratesheet_engine::config::{config_keys, EngineConfig};
use ratesheet_engine::engine::{
    ArtifactSink, GenerationOrchestrator, JsonManifestSink, NoOpSink, SourceDocuments,
};
use ratesheet_engine::logging;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ratesheet-engine")]
#[command(about = "Tiered rate-sheet generation engine")]
#[command(version)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, global = true, env = config_keys::CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 生成分层利率表
    Generate {
        /// 客户层级 CSV
        #[arg(long)]
        customer_tiers: PathBuf,

        /// 调整表工作簿
        #[arg(long)]
        adjustors: PathBuf,

        /// DEL 渠道基准工作簿
        #[arg(long)]
        del_base: PathBuf,

        /// NONDEL 渠道基准工作簿
        #[arg(long)]
        nondel_base: PathBuf,

        /// 生效日 (YYYY-MM-DD)
        #[arg(long)]
        effective_date: NaiveDate,

        /// 输出根目录 (覆盖配置与环境变量)
        #[arg(long)]
        storage_root: Option<PathBuf>,

        /// 产物清单 JSON 输出路径
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// 打印解析后的调整表
    Inspect {
        /// 调整表工作簿
        #[arg(long)]
        adjustors: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    info!(
        version = ratesheet_engine::VERSION,
        "{}",
        ratesheet_engine::APP_NAME
    );

    let config = EngineConfig::load(cli.config.as_deref()).context("无法加载配置")?;

    match cli.command {
        Command::Generate {
            customer_tiers,
            adjustors,
            del_base,
            nondel_base,
            effective_date,
            storage_root,
            manifest,
        } => {
            let config = match storage_root {
                Some(root) => config.with_storage_root(root),
                None => config,
            };
            let sources = SourceDocuments {
                customer_tiers_csv: customer_tiers,
                adjustors_xlsx: adjustors,
                del_base_xlsx: del_base,
                nondel_base_xlsx: nondel_base,
            };

            let mut sink: Box<dyn ArtifactSink> = match manifest {
                Some(path) => Box::new(JsonManifestSink::new(path)),
                None => Box::new(NoOpSink),
            };

            let orchestrator = GenerationOrchestrator::new(config);
            let report = orchestrator
                .generate(&sources, effective_date, sink.as_mut())
                .context("利率表生成失败")?;

            for artifact in &report.artifacts {
                println!("{}", artifact.generated_path.display());
            }
            info!(
                artifacts = report.artifacts.len(),
                customers = report.customers.len(),
                "完成"
            );
        }

        Command::Inspect { adjustors } => {
            let orchestrator = GenerationOrchestrator::new(config);
            let table = orchestrator
                .load_adjustments(&adjustors)
                .context("调整表解析失败")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&table).context("调整表序列化失败")?
            );
        }
    }

    Ok(())
}
