//! 亮度信号持久化
//!
//! 每个信号保存为存储目录下的 `<n>.json`，n 为当前最大编号 + 1，
//! 中间的空缺不会被复用；目录为空时从 1 开始。
//! 文件以 `create_new` 创建，编号被并发占用时顺延到下一个。

use super::error::ScanError;
use super::signal::BrightnessSignal;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

static SIGNAL_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.json$").unwrap());

#[derive(Debug, Clone)]
pub struct SignalStore {
    root_path: PathBuf,
}

impl SignalStore {
    pub fn with_path(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn signal_path(&self, id: u64) -> PathBuf {
        self.root_path.join(format!("{id}.json"))
    }

    /// 已保存信号的编号（升序）；目录不存在时为空
    pub fn ids(&self) -> Result<Vec<u64>, ScanError> {
        if !self.root_path.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root_path)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(id) = SIGNAL_FILE
                .captures(name)
                .and_then(|caps| caps[1].parse::<u64>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn latest(&self) -> Result<Option<u64>, ScanError> {
        Ok(self.ids()?.last().copied())
    }

    pub fn next_id(&self) -> Result<u64, ScanError> {
        Ok(self.latest()?.map_or(1, |id| id + 1))
    }

    /// 保存信号，返回分配的编号
    pub fn save(&self, signal: &BrightnessSignal) -> Result<u64, ScanError> {
        fs::create_dir_all(&self.root_path)?;

        let json = serde_json::to_string(signal)?;
        let mut id = self.next_id()?;

        loop {
            let path = self.signal_path(id);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())?;
                    info!("💾 Saved signal #{} ({} samples) to {:?}", id, signal.len(), path);
                    return Ok(id);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!("⚠️ Signal #{} already taken, trying #{}", id, id + 1);
                    id += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn load(&self, id: u64) -> Result<BrightnessSignal, ScanError> {
        let path = self.signal_path(id);
        if !path.exists() {
            return Err(ScanError::SignalNotFound(id));
        }

        let json = fs::read_to_string(&path)?;
        let signal: BrightnessSignal = serde_json::from_str(&json)?;
        debug!("Loaded signal #{} with {} samples", id, signal.len());
        Ok(signal)
    }
}
