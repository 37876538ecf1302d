//! 亮度信号提取管理器

use super::error::ScanError;
use super::frame::Frame;
use super::luminance::{LuminanceExtractor, DEFAULT_DOWNSCALE_FACTOR};
use super::signal::{BrightnessSignal, BrightnessSignalBuilder};
use super::source::{FrameRead, FrameSource};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 每个方向的面积平均缩小倍数
    pub downscale_factor: u32,
    /// 每批并行处理的帧数
    pub batch_size: usize,
    /// 工作线程数，None 表示使用全部 CPU
    pub num_threads: Option<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
            batch_size: 64,
            num_threads: None,
        }
    }
}

impl ExtractionConfig {
    pub fn for_high_fidelity() -> Self {
        Self {
            downscale_factor: 4,
            batch_size: 32,
            ..Default::default()
        }
    }

    pub fn for_fast_preview() -> Self {
        Self {
            downscale_factor: 32,
            batch_size: 128,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.downscale_factor == 0 {
            return Err(ScanError::Config("downscale_factor must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ScanError::Config("batch_size must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(ScanError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

/// 提取统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionStats {
    pub processed_frames: u64,
    pub truncated_runs: u64,
}

/// 一次提取的结果
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub signal: BrightnessSignal,
    /// 流在结束前丢帧，信号比名义时长短
    pub truncated: bool,
}

/// 亮度信号提取管理器
pub struct SignalExtractorManager {
    extractor: LuminanceExtractor,
    batch_size: usize,
    pool: ThreadPool,
    frame_count: Arc<Mutex<u64>>,
    truncated_count: Arc<Mutex<u64>>,
}

impl SignalExtractorManager {
    pub fn new() -> Result<Self, ScanError> {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Result<Self, ScanError> {
        config.validate()?;

        let num_threads = config.num_threads.unwrap_or_else(num_cpus::get);
        debug!("Using {} threads for luminance extraction", num_threads);

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("luminance-{}", i))
            .build()
            .map_err(|e| {
                error!("❌ Failed to build thread pool: {}", e);
                ScanError::ThreadPool(e.to_string())
            })?;

        Ok(Self {
            extractor: LuminanceExtractor::with_factor(config.downscale_factor)?,
            batch_size: config.batch_size,
            pool,
            frame_count: Arc::new(Mutex::new(0)),
            truncated_count: Arc::new(Mutex::new(0)),
        })
    }

    pub fn get_stats(&self) -> ExtractionStats {
        let processed_frames = self.frame_count.lock().map(|c| *c).unwrap_or(0);
        let truncated_runs = self.truncated_count.lock().map(|c| *c).unwrap_or(0);
        ExtractionStats {
            processed_frames,
            truncated_runs,
        }
    }

    pub fn reset(&self) {
        if let Ok(mut count) = self.frame_count.lock() {
            *count = 0;
        }
        if let Ok(mut truncated) = self.truncated_count.lock() {
            *truncated = 0;
        }
    }

    /// 批量并行计算亮度，输出顺序与输入帧顺序一致
    pub fn process_batch(&self, frames: Vec<Frame>) -> Vec<f64> {
        let batch_len = frames.len() as u64;
        let extractor = self.extractor;

        let samples: Vec<f64> = self
            .pool
            .install(|| frames.into_par_iter().map(|f| extractor.extract(&f)).collect());

        if let Ok(mut count) = self.frame_count.lock() {
            *count += batch_len;
        }

        samples
    }

    /// 从帧来源提取完整亮度信号。
    ///
    /// 帧率只在开始时读取一次。中途缺帧视为流提前结束，保留已提取的部分。
    pub fn extract(&self, source: &mut dyn FrameSource) -> Result<ExtractionOutcome, ScanError> {
        let frame_rate = source.frame_rate();
        let mut builder = BrightnessSignalBuilder::new(frame_rate).map_err(|e| {
            error!("❌ Source reported unusable frame rate {}", frame_rate);
            e
        })?;

        info!("🎬 Extracting brightness signal at {} fps", frame_rate);

        let mut batch = Vec::with_capacity(self.batch_size);
        let mut truncated = false;

        loop {
            match source.read_frame() {
                FrameRead::Frame(frame) => {
                    batch.push(frame);
                    if batch.len() == self.batch_size {
                        let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                        builder.extend(self.process_batch(full));
                        debug!("{} frames added", builder.len());
                    }
                }
                FrameRead::Missing => {
                    truncated = true;
                    break;
                }
                FrameRead::End => break,
            }
        }

        if !batch.is_empty() {
            builder.extend(self.process_batch(batch));
        }

        if truncated {
            warn!(
                "⚠️ Stream ended unexpectedly after {} frames, using partial signal",
                builder.len()
            );
            if let Ok(mut count) = self.truncated_count.lock() {
                *count += 1;
            }
        }

        let signal = builder.build();
        info!(
            "✅ Brightness signal ready: {} samples ({:.2}s)",
            signal.len(),
            signal.duration_secs()
        );

        Ok(ExtractionOutcome { signal, truncated })
    }
}
