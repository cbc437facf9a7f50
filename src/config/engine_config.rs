// ==========================================
// 分层利率表生成引擎 - 引擎配置
// ==========================================
// 职责: 投资方、产品清单、存储根目录、版式契约
// 来源: 默认值 → TOML 文件 → 环境变量 (后者覆盖前者)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::layout::{AdjustorLayout, BaseGridLayout};
use crate::domain::tier::default_tier_codes;
use crate::domain::types::Channel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 输出根目录覆盖
    pub const STORAGE_ROOT_ENV: &str = "RATESHEET_STORAGE_ROOT";
    /// 配置文件路径
    pub const CONFIG_PATH_ENV: &str = "RATESHEET_CONFIG";
}

/// 调整表中缺少产品编号/名称的数据行的处理方式
///
/// 是否应当报错尚待业务确认,默认保持跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    #[default]
    Skip,
    Reject,
}

/// 产品定义: 产品组代码 → 基准工作簿中的工作表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub code: String,
    pub sheet_name: String,
}

impl ProductSpec {
    pub fn new(code: &str, sheet_name: &str) -> Self {
        Self {
            code: code.to_string(),
            sheet_name: sheet_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 投资方代码 (文件名前缀与目录第一层)
    pub investor_code: String,
    pub storage_root: PathBuf,
    /// 生成顺序
    pub channels: Vec<Channel>,
    pub products: Vec<ProductSpec>,
    /// 产品无层级调整时的兜底层级 (调整值 0.0)
    pub default_tier_codes: Vec<String>,
    pub adjustor_layout: AdjustorLayout,
    pub base_grid_layout: BaseGridLayout,
    pub malformed_row_policy: MalformedRowPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            investor_code: "PHH".to_string(),
            storage_root: default_storage_root(),
            channels: Channel::ALL.to_vec(),
            products: vec![
                ProductSpec::new("FULLDOC", "PHH - FullDoc"),
                ProductSpec::new("ALTDOC", "PHH - AltDoc"),
                ProductSpec::new("DSCR", "PHH - DSCR"),
            ],
            default_tier_codes: default_tier_codes(),
            adjustor_layout: AdjustorLayout::default(),
            base_grid_layout: BaseGridLayout::default(),
            malformed_row_policy: MalformedRowPolicy::Skip,
        }
    }
}

/// 默认输出根目录
pub fn default_storage_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("ratesheet-engine"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl EngineConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: TOML 配置文件; None 时使用默认值
    ///
    /// # 说明
    /// 加载后应用环境变量覆盖并校验
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadError {
                    path: p.display().to_string(),
                    message: e.to_string(),
                })?;
                info!(path = %p.display(), "加载配置文件");
                Self::from_toml_str(&content, &p.display().to_string())?
            }
            None => {
                debug!("未指定配置文件,使用默认配置");
                Self::default()
            }
        };

        if let Ok(root) = std::env::var(config_keys::STORAGE_ROOT_ENV) {
            if !root.trim().is_empty() {
                debug!(storage_root = %root, "环境变量覆盖输出根目录");
                config.storage_root = PathBuf::from(root.trim());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析 (未出现的字段取默认值)
    pub fn from_toml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn with_storage_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.storage_root = root.into();
        self
    }

    /// 校验配置与版式契约
    pub fn validate(&self) -> ConfigResult<()> {
        if self.investor_code.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "investor_code".to_string(),
                message: "投资方代码不能为空".to_string(),
            });
        }

        if self.channels.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "channels".to_string(),
                message: "至少需要一个渠道".to_string(),
            });
        }

        let mut codes = HashSet::new();
        for product in &self.products {
            if product.code.trim().is_empty() || product.sheet_name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "products".to_string(),
                    message: format!("产品代码与工作表名不能为空: {:?}", product),
                });
            }
            if !codes.insert(product.code.to_uppercase()) {
                return Err(ConfigError::InvalidValue {
                    key: "products".to_string(),
                    message: format!("产品代码重复: {}", product.code),
                });
            }
        }

        if self.default_tier_codes.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "default_tier_codes".to_string(),
                message: "兜底层级列表不能为空".to_string(),
            });
        }

        self.adjustor_layout.validate()?;
        self.base_grid_layout.validate()?;
        Ok(())
    }

    /// 按产品组代码查找产品定义 (不区分大小写)
    pub fn product(&self, code: &str) -> Option<&ProductSpec> {
        self.products
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }
}
