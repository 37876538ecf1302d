//! 闪烁检测 - 在亮度信号上按一秒窗口统计显著的明暗反转次数

use super::error::ScanError;
use super::signal::BrightnessSignal;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::iter::StepBy;
use std::ops::Range;

/// 当前趋势方向，由 `reference - sample` 的符号决定：
/// 差值为正表示新样本更暗（`Darkening`），为负表示更亮（`Brightening`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Undefined,
    Darkening,
    Brightening,
}

impl Direction {
    /// 零差值没有方向
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Darkening
        } else if delta < 0.0 {
            Direction::Brightening
        } else {
            Direction::Undefined
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Darkening => Direction::Brightening,
            Direction::Brightening => Direction::Darkening,
            Direction::Undefined => Direction::Undefined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// 超过该亮度差才算显著变化
    pub brightness_threshold: f64,
    /// 一个窗口内反转次数达到该值即判定危险
    pub hz_threshold: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 20.0,
            hz_threshold: 3,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if !self.brightness_threshold.is_finite() || self.brightness_threshold < 0.0 {
            return Err(ScanError::Config(format!(
                "brightness_threshold must be a non-negative number, got {}",
                self.brightness_threshold
            )));
        }
        Ok(())
    }
}

/// 危险窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashEvent {
    pub window_start: usize,
    pub oscillations: u32,
}

impl FlashEvent {
    /// 近似时间（秒）；`window_len` 为取整后的帧率
    pub fn seconds(&self, window_len: usize) -> f64 {
        self.window_start as f64 / window_len as f64
    }
}

/// 反转计数器。`direction` 在整个信号上持续，窗口之间不重置。
#[derive(Debug, Clone)]
pub struct OscillationCounter {
    direction: Direction,
    brightness_threshold: f64,
}

impl OscillationCounter {
    pub fn new(brightness_threshold: f64) -> Self {
        Self::starting_from(Direction::Undefined, brightness_threshold)
    }

    pub fn starting_from(direction: Direction, brightness_threshold: f64) -> Self {
        Self {
            direction,
            brightness_threshold,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 统计一个窗口内的反转次数
    pub fn count_window(&mut self, window: &[f64]) -> u32 {
        let Some(&first) = window.first() else {
            return 0;
        };

        let mut reference = first;
        let mut oscillations = 0;

        for &sample in window {
            let delta = reference - sample;
            if delta.abs() <= self.brightness_threshold {
                continue;
            }

            // 超过阈值的差值必然非零
            if Direction::of(delta) == self.direction {
                reference = sample;
                continue;
            }

            oscillations += 1;
            reference = sample;
            self.direction = match self.direction {
                // reference 已等于 sample，差值恒为零，方向保持未定义
                Direction::Undefined => Direction::of(sample - reference),
                current => current.flipped(),
            };
        }

        oscillations
    }
}

/// 可分析窗口的起始下标。
///
/// 末尾不足或恰好一个窗口的样本被丢弃，之后最后一个完整窗口也不分析。
pub fn analyzable_window_starts(len: usize, window_len: usize) -> StepBy<Range<usize>> {
    let window_len = window_len.max(1);
    let trailing = match len % window_len {
        0 => window_len,
        rest => rest,
    };
    let analyzable_end = len.saturating_sub(trailing);
    let limit = analyzable_end.saturating_sub(window_len);
    (0..limit).step_by(window_len)
}

pub struct FlashDetector {
    config: DetectorConfig,
}

impl FlashDetector {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn with_config(config: DetectorConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// 单线程顺序扫描整个信号
    pub fn detect(&self, signal: &BrightnessSignal) -> Vec<FlashEvent> {
        let window_len = signal.window_len();
        let samples = signal.samples();
        let mut counter = OscillationCounter::new(self.config.brightness_threshold);
        let mut events = Vec::new();

        for window_start in analyzable_window_starts(samples.len(), window_len) {
            let window = &samples[window_start..window_start + window_len];
            let oscillations = counter.count_window(window);

            debug!(
                "Window {} - {}: {} oscillations, direction {:?}",
                window_start,
                window_start + window_len,
                oscillations,
                counter.direction()
            );

            if oscillations >= self.config.hz_threshold {
                warn!(
                    "⚠️ Hazardous flashing in frames {} - {} with {} oscillations",
                    window_start,
                    window_start + window_len,
                    oscillations
                );
                events.push(FlashEvent {
                    window_start,
                    oscillations,
                });
            }
        }

        info!(
            "✅ Flash detection done: {} samples, {} hazardous windows",
            samples.len(),
            events.len()
        );

        events
    }

    /// 事件 → 秒
    pub fn timestamps(events: &[FlashEvent], signal: &BrightnessSignal) -> Vec<f64> {
        let window_len = signal.window_len();
        events.iter().map(|e| e.seconds(window_len)).collect()
    }
}

impl Default for FlashDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating(len: usize, high: f64, low: f64) -> Vec<f64> {
        (0..len).map(|i| if i % 2 == 0 { high } else { low }).collect()
    }

    #[test]
    fn test_window_starts_exclude_two_guard_windows() {
        let starts: Vec<usize> = analyzable_window_starts(95, 30).collect();
        assert_eq!(starts, vec![0, 30]);
    }

    #[test]
    fn test_window_starts_even_division() {
        // 90 / 30：整除时也丢弃一整个窗口
        let starts: Vec<usize> = analyzable_window_starts(90, 30).collect();
        assert_eq!(starts, vec![0]);
    }

    #[test]
    fn test_window_starts_short_signal() {
        assert_eq!(analyzable_window_starts(0, 30).count(), 0);
        assert_eq!(analyzable_window_starts(25, 30).count(), 0);
        assert_eq!(analyzable_window_starts(60, 30).count(), 0);
        assert_eq!(analyzable_window_starts(61, 30).count(), 1);
        assert_eq!(analyzable_window_starts(91, 30).count(), 2);
    }

    #[test]
    fn test_alternating_window_counts_every_reversal() {
        let mut counter = OscillationCounter::new(20.0);
        let window = [100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0];

        assert_eq!(counter.count_window(&window), 9);
        assert_eq!(counter.direction(), Direction::Undefined);
    }

    #[test]
    fn test_flat_window() {
        for threshold in [0.0, 20.0, 1000.0] {
            let mut counter = OscillationCounter::new(threshold);
            assert_eq!(counter.count_window(&[42.0; 30]), 0);
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut counter = OscillationCounter::new(20.0);
        assert_eq!(counter.count_window(&[100.0, 80.0, 100.0, 80.0]), 0);
        assert_eq!(counter.count_window(&[100.0, 79.0, 100.0]), 2);
    }

    #[test]
    fn test_direction_follows_brightness() {
        // reference 100，新样本 40 更暗
        assert_eq!(Direction::of(100.0 - 40.0), Direction::Darkening);
        assert_eq!(Direction::of(40.0 - 100.0), Direction::Brightening);
        assert_eq!(Direction::of(0.0), Direction::Undefined);
        assert_eq!(Direction::Darkening.flipped(), Direction::Brightening);
        assert_eq!(Direction::Undefined.flipped(), Direction::Undefined);
    }

    #[test]
    fn test_continuation_and_flip() {
        let mut counter = OscillationCounter::starting_from(Direction::Darkening, 20.0);

        // 100 → 50 → 0 持续变暗，0 → 100 反转为变亮
        assert_eq!(counter.count_window(&[100.0, 50.0, 0.0, 100.0]), 1);
        assert_eq!(counter.direction(), Direction::Brightening);
    }

    #[test]
    fn test_direction_carries_across_windows() {
        let mut counter = OscillationCounter::starting_from(Direction::Darkening, 20.0);

        counter.count_window(&[0.0, 100.0]);
        assert_eq!(counter.direction(), Direction::Brightening);

        // 新窗口沿用 Brightening：0 → 100 为延续
        assert_eq!(counter.count_window(&[0.0, 100.0]), 0);
        assert_eq!(counter.direction(), Direction::Brightening);

        assert_eq!(counter.count_window(&[100.0, 0.0]), 1);
        assert_eq!(counter.direction(), Direction::Darkening);
    }

    #[test]
    fn test_detect_flags_windows() {
        // rate 10, 45 个样本 → 分析 0、10、20 三个窗口
        let mut samples = alternating(10, 100.0, 0.0);
        samples.extend([50.0; 10]);
        samples.extend(alternating(10, 200.0, 120.0));
        samples.extend(alternating(15, 255.0, 0.0));
        let signal = BrightnessSignal::new(10.0, samples).unwrap();

        let events = FlashDetector::new().detect(&signal);
        assert_eq!(
            events,
            vec![
                FlashEvent {
                    window_start: 0,
                    oscillations: 9
                },
                FlashEvent {
                    window_start: 20,
                    oscillations: 9
                },
            ]
        );
        assert_eq!(FlashDetector::timestamps(&events, &signal), vec![0.0, 2.0]);
    }

    #[test]
    fn test_hz_threshold() {
        let mut samples = vec![0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        samples.extend([0.0; 20]);
        let signal = BrightnessSignal::new(10.0, samples).unwrap();

        assert!(FlashDetector::new().detect(&signal).is_empty());

        let lenient = FlashDetector::with_config(DetectorConfig {
            hz_threshold: 2,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(lenient.detect(&signal).len(), 1);
    }

    #[test]
    fn test_short_signal_yields_nothing() {
        let signal = BrightnessSignal::new(30.0, alternating(50, 255.0, 0.0)).unwrap();
        assert!(FlashDetector::new().detect(&signal).is_empty());

        let empty = BrightnessSignal::new(30.0, vec![]).unwrap();
        assert!(FlashDetector::new().detect(&empty).is_empty());
    }

    #[test]
    fn test_timestamp_conversion() {
        let event = FlashEvent {
            window_start: 60,
            oscillations: 5,
        };
        assert_eq!(event.seconds(30), 2.0);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let signal = BrightnessSignal::new(24.0, alternating(200, 180.0, 20.0)).unwrap();
        let detector = FlashDetector::new();

        let first = detector.detect(&signal);
        let second = detector.detect(&signal);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config() {
        let config = DetectorConfig {
            brightness_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            FlashDetector::with_config(config),
            Err(ScanError::Config(_))
        ));
    }
}
