// ==========================================
// 分层利率表生成引擎 - 客户层级 CSV 解析器
// ==========================================
// 表头: Org Name, Org ID, NMLSID, Primary Email, DEL NonAgency, ND NonAgency
// 必需: Org Name, Org ID; 其余列缺失时对应字段为 None
// 说明: 结果用于下游卖方层级登记,不影响利率表生成
// ==========================================

use crate::domain::customer::CustomerTier;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// 可识别的表头
pub const CUSTOMER_TIER_HEADERS: [&str; 6] = [
    "Org Name",
    "Org ID",
    "NMLSID",
    "Primary Email",
    "DEL NonAgency",
    "ND NonAgency",
];

/// 必需表头
pub const REQUIRED_CUSTOMER_HEADERS: [&str; 2] = ["Org Name", "Org ID"];

pub struct CustomerTierParser;

impl CustomerTierParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<CustomerTier>> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let records = self.parse_reader(file)?;
        debug!(path = %path.display(), customers = records.len(), "客户层级 CSV 解析完成");
        Ok(records)
    }

    /// 从任意读取源解析
    pub fn parse_reader<R: std::io::Read>(&self, source: R) -> ImportResult<Vec<CustomerTier>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(source);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let missing: Vec<&str> = REQUIRED_CUSTOMER_HEADERS
            .iter()
            .copied()
            .filter(|h| !headers.iter().any(|x| x == h))
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::CsvParseError(format!(
                "缺少列: {}",
                missing.join(", ")
            )));
        }
        let absent: Vec<&str> = CUSTOMER_TIER_HEADERS
            .iter()
            .copied()
            .filter(|h| !headers.iter().any(|x| x == h))
            .collect();
        if !absent.is_empty() {
            debug!(columns = ?absent, "客户层级 CSV 缺少可选列");
        }

        let mut customers = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map: HashMap<&str, &str> = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.as_str(), value.trim());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            let optional = |key: &str| {
                row_map
                    .get(key)
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
            };

            customers.push(CustomerTier {
                org_name: optional("Org Name").unwrap_or_default(),
                org_id: optional("Org ID").unwrap_or_default(),
                nmlsid: optional("NMLSID"),
                primary_email: optional("Primary Email"),
                del_tier: optional("DEL NonAgency"),
                nondel_tier: optional("ND NonAgency"),
            });
        }

        Ok(customers)
    }
}
