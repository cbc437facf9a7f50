// ==========================================
// 分层利率表生成引擎 - 产物登记
// ==========================================
// 职责: 定义产物登记 trait,引擎不关心产物记录如何持久化
// 说明: 每写出一个工作簿调用一次 record,整次生成结束调用 finish
// ==========================================

use crate::domain::artifact::OutputArtifact;
use crate::engine::error::{EngineError, EngineResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ==========================================
// 产物登记 Trait
// ==========================================

/// 产物登记者
///
/// # 实现说明
/// - `Vec<OutputArtifact>`: 内存收集 (测试与嵌入调用)
/// - `JsonManifestSink`: 结束时写出 JSON 清单
/// - 外部系统 (任务记录、文件记录) 自行实现
pub trait ArtifactSink {
    /// 登记一个已写出的产物
    fn record(&mut self, artifact: &OutputArtifact) -> EngineResult<()>;

    /// 整次生成成功结束
    fn finish(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

impl ArtifactSink for Vec<OutputArtifact> {
    fn record(&mut self, artifact: &OutputArtifact) -> EngineResult<()> {
        self.push(artifact.clone());
        Ok(())
    }
}

/// 空操作登记者
#[derive(Debug, Clone, Default)]
pub struct NoOpSink;

impl ArtifactSink for NoOpSink {
    fn record(&mut self, artifact: &OutputArtifact) -> EngineResult<()> {
        debug!(filename = %artifact.generated_filename, "NoOpSink: 跳过产物登记");
        Ok(())
    }
}

/// JSON 清单登记者
///
/// 生成中途失败时不写清单 (已写出的工作簿保留在磁盘上)
#[derive(Debug)]
pub struct JsonManifestSink {
    path: PathBuf,
    artifacts: Vec<OutputArtifact>,
}

impl JsonManifestSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifacts(&self) -> &[OutputArtifact] {
        &self.artifacts
    }
}

impl ArtifactSink for JsonManifestSink {
    fn record(&mut self, artifact: &OutputArtifact) -> EngineResult<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }

    fn finish(&mut self) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(&self.artifacts)
            .map_err(|e| EngineError::Sink(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)?;

        info!(
            path = %self.path.display(),
            artifacts = self.artifacts.len(),
            "产物清单已写出"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Channel;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn artifact(tier: &str) -> OutputArtifact {
        OutputArtifact {
            channel: Channel::Del,
            product_code: "FULLDOC".to_string(),
            tier_code: tier.to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            adjustment_value: 0.1,
            generated_filename: format!("PHH_DEL_FULLDOC_{}_20240115.xlsx", tier),
            generated_path: PathBuf::from("/tmp/out.xlsx"),
        }
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<OutputArtifact> = Vec::new();
        sink.record(&artifact("NA1")).unwrap();
        sink.record(&artifact("NA2")).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].tier_code, "NA2");
    }

    #[test]
    fn test_manifest_written_on_finish() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("manifest.json");
        let mut sink = JsonManifestSink::new(&path);

        sink.record(&artifact("NA1")).unwrap();
        assert!(!path.exists());
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<OutputArtifact> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![artifact("NA1")]);
        assert!(content.contains("\"channel\": \"DEL\""));
        assert!(content.contains("\"effective_date\": \"2024-01-15\""));
    }
}
