// ==========================================
// 分层利率表生成引擎 - 输出命名
// ==========================================
// 目录: <root>/<investor>/<YYYYMMDD>/<channel>/<product>/
// 文件: <investor>_<channel>_<product>_<tier>_<YYYYMMDD>.xlsx
// ==========================================

use crate::domain::types::Channel;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// 一个输出工作簿的命名要素
#[derive(Debug, Clone, Copy)]
pub struct OutputName<'a> {
    pub investor: &'a str,
    pub channel: Channel,
    pub product: &'a str,
    pub tier: &'a str,
    pub effective_date: NaiveDate,
}

impl<'a> OutputName<'a> {
    pub fn date_stamp(&self) -> String {
        self.effective_date.format("%Y%m%d").to_string()
    }

    pub fn filename(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}.xlsx",
            self.investor,
            self.channel,
            self.product,
            self.tier,
            self.date_stamp()
        )
    }

    pub fn directory(&self, storage_root: &Path) -> PathBuf {
        storage_root
            .join(self.investor)
            .join(self.date_stamp())
            .join(self.channel.as_str())
            .join(self.product)
    }

    pub fn path(&self, storage_root: &Path) -> PathBuf {
        self.directory(storage_root).join(self.filename())
    }
}
