//! 扫描配置，支持 JSON5（可带注释）

use crate::core::video::{DetectorConfig, ExtractionConfig, ScanError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extraction: ExtractionConfig,
    pub detector: DetectorConfig,
    /// 设置后每次扫描的信号都会保存到该目录
    pub store_dir: Option<PathBuf>,
}

impl ScanConfig {
    pub fn from_json5_str(text: &str) -> Result<Self, ScanError> {
        let config: Self = json5::from_str(text).map_err(|e| {
            error!("❌ Failed to parse scan config: {}", e);
            ScanError::Config(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        info!("📖 Reading scan config: {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_json5_str(&text)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        self.extraction.validate()?;
        self.detector.validate()
    }
}
