use crate::core::video::FlashEvent;
use serde::Serialize;

/// 一次扫描的结果
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// 信号的名义帧率（未取整）
    pub sampling_rate: f64,
    pub sample_count: usize,
    /// 流提前结束，信号不完整
    pub truncated: bool,
    pub events: Vec<FlashEvent>,
    /// 危险窗口起点（秒）。帧率取整，时间越靠后误差越大
    pub timestamps: Vec<f64>,
    /// 信号在 SignalStore 中的编号
    pub stored_as: Option<u64>,
}

impl ScanReport {
    pub fn is_hazardous(&self) -> bool {
        !self.events.is_empty()
    }
}

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanStats {
    pub processed_frames: u64,
    pub truncated_runs: u64,
    pub flagged_windows: u64,
}
