use super::error::ScanError;
use serde::{Deserialize, Serialize};

/// 亮度信号：固定采样率 + 按帧顺序排列的平均亮度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SignalRecord")]
pub struct BrightnessSignal {
    #[serde(rename = "rate")]
    sampling_rate: f64,
    samples: Vec<f64>,
}

impl BrightnessSignal {
    pub fn new(sampling_rate: f64, samples: Vec<f64>) -> Result<Self, ScanError> {
        validate_rate(sampling_rate)?;
        Ok(Self {
            sampling_rate,
            samples,
        })
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// 取整后的帧率，即一个窗口的样本数
    pub fn window_len(&self) -> usize {
        rounded_rate(self.sampling_rate) as usize
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 按名义帧率推算的时长（秒）
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate
    }
}

#[derive(Deserialize)]
struct SignalRecord {
    rate: f64,
    samples: Vec<f64>,
}

impl TryFrom<SignalRecord> for BrightnessSignal {
    type Error = ScanError;

    fn try_from(record: SignalRecord) -> Result<Self, Self::Error> {
        Self::new(record.rate, record.samples)
    }
}

/// 恰好在中间的帧率取偶数（29.5 → 30，30.5 → 30）
fn rounded_rate(sampling_rate: f64) -> f64 {
    sampling_rate.round_ties_even()
}

fn validate_rate(sampling_rate: f64) -> Result<(), ScanError> {
    if !sampling_rate.is_finite() || rounded_rate(sampling_rate) < 1.0 {
        return Err(ScanError::InvalidFrameRate(sampling_rate));
    }
    Ok(())
}

/// 按到达顺序累积逐帧样本
#[derive(Debug)]
pub struct BrightnessSignalBuilder {
    sampling_rate: f64,
    samples: Vec<f64>,
}

impl BrightnessSignalBuilder {
    pub fn new(sampling_rate: f64) -> Result<Self, ScanError> {
        validate_rate(sampling_rate)?;
        Ok(Self {
            sampling_rate,
            samples: Vec::new(),
        })
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, samples: I) {
        self.samples.extend(samples);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn build(self) -> BrightnessSignal {
        BrightnessSignal {
            sampling_rate: self.sampling_rate,
            samples: self.samples,
        }
    }
}
