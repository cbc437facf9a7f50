// ==========================================
// 分层利率表生成引擎 - 输出产物描述
// ==========================================
// 每次成功写出一个工作簿生成一条,之后不可变
// ==========================================

use crate::domain::types::Channel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub channel: Channel,
    pub product_code: String,
    pub tier_code: String,
    pub effective_date: NaiveDate,
    pub adjustment_value: f64,
    pub generated_filename: String,
    pub generated_path: PathBuf,
}
