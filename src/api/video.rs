//! 视频闪烁扫描器

use crate::api::config::ScanConfig;
use crate::api::models::report::{ScanReport, ScanStats};
use crate::core::video::{
    BrightnessSignal, FlashDetector, FlashEvent, FrameSource, ScanError, SignalExtractorManager,
    SignalStore,
};
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// 视频闪烁扫描器 - 亮度提取 + 闪烁检测
///
/// ```no_run
/// use flash_scan::api::{FlashScanner, ScanConfig};
/// use flash_scan::core::video::ImageSequenceSource;
///
/// let scanner = FlashScanner::create(ScanConfig::default())?;
/// let mut source = ImageSequenceSource::open("frames/", 30.0)?;
/// let report = scanner.scan(&mut source)?;
/// println!("{:?}", report.timestamps);
/// # Ok::<(), flash_scan::core::video::ScanError>(())
/// ```
pub struct FlashScanner {
    manager: SignalExtractorManager,
    detector: FlashDetector,
    store: Option<SignalStore>,
    flagged_count: Arc<Mutex<u64>>,
}

impl FlashScanner {
    pub fn create(config: ScanConfig) -> Result<Self, ScanError> {
        crate::init_logging();
        config.validate()?;

        let store = config.store_dir.map(SignalStore::with_path);
        if let Some(store) = &store {
            info!("💾 Signals will be stored in {:?}", store.root_path());
        }

        info!("🎬 FlashScanner: created");
        Ok(Self {
            manager: SignalExtractorManager::with_config(config.extraction)?,
            detector: FlashDetector::with_config(config.detector)?,
            store,
            flagged_count: Arc::new(Mutex::new(0)),
        })
    }

    /// 提取亮度信号（可选保存），然后检测闪烁
    pub fn scan(&self, source: &mut dyn FrameSource) -> Result<ScanReport, ScanError> {
        let outcome = self.manager.extract(source)?;

        let stored_as = match &self.store {
            Some(store) => Some(store.save(&outcome.signal)?),
            None => None,
        };

        Ok(self.report(&outcome.signal, outcome.truncated, stored_as))
    }

    /// 对已保存的信号重新检测
    pub fn scan_stored(&self, id: u64) -> Result<ScanReport, ScanError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ScanError::Config("no store_dir configured".into()))?;
        let signal = store.load(id)?;
        Ok(self.report(&signal, false, Some(id)))
    }

    pub fn analyze(&self, signal: &BrightnessSignal) -> Vec<FlashEvent> {
        let events = self.detector.detect(signal);
        if let Ok(mut count) = self.flagged_count.lock() {
            *count += events.len() as u64;
        }
        events
    }

    fn report(&self, signal: &BrightnessSignal, truncated: bool, stored_as: Option<u64>) -> ScanReport {
        let events = self.analyze(signal);
        let timestamps = FlashDetector::timestamps(&events, signal);

        if truncated {
            warn!("⚠️ Report built from a truncated signal ({} samples)", signal.len());
        }
        info!("📊 Hazardous timestamps: {:?}", timestamps);

        ScanReport {
            sampling_rate: signal.sampling_rate(),
            sample_count: signal.len(),
            truncated,
            events,
            timestamps,
            stored_as,
        }
    }

    pub fn stats(&self) -> ScanStats {
        let extraction = self.manager.get_stats();
        let flagged_windows = self.flagged_count.lock().map(|c| *c).unwrap_or(0);
        ScanStats {
            processed_frames: extraction.processed_frames,
            truncated_runs: extraction.truncated_runs,
            flagged_windows,
        }
    }

    pub fn reset(&self) {
        self.manager.reset();
        if let Ok(mut count) = self.flagged_count.lock() {
            *count = 0;
        }
    }
}

impl Drop for FlashScanner {
    fn drop(&mut self) {
        info!("🗑️ FlashScanner: released");
    }
}
