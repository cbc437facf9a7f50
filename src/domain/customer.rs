// ==========================================
// 分层利率表生成引擎 - 客户层级记录
// ==========================================
// 来源: 层级 CSV (Org Name, Org ID, NMLSID, Primary Email, DEL NonAgency, ND NonAgency)
// 用途: 下游卖方层级登记,不参与利率表生成
// ==========================================

use crate::domain::types::Channel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTier {
    pub org_name: String,
    pub org_id: String,
    pub nmlsid: Option<String>,
    pub primary_email: Option<String>,
    pub del_tier: Option<String>,
    pub nondel_tier: Option<String>,
}

impl CustomerTier {
    pub fn tier_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Del => self.del_tier.as_deref(),
            Channel::Nondel => self.nondel_tier.as_deref(),
        }
    }
}
