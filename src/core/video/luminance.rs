use super::error::ScanError;
use super::frame::Frame;

pub const BLUE_WEIGHT: f64 = 0.0722;
pub const GREEN_WEIGHT: f64 = 0.7152;
pub const RED_WEIGHT: f64 = 0.2126;

pub const DEFAULT_DOWNSCALE_FACTOR: u32 = 16;

/// 相对亮度（参数顺序为 B、G、R）
#[inline]
pub fn relative_luminance(blue: f64, green: f64, red: f64) -> f64 {
    BLUE_WEIGHT * blue + GREEN_WEIGHT * green + RED_WEIGHT * red
}

/// 单帧 → 单个平均相对亮度值
#[derive(Debug, Clone, Copy)]
pub struct LuminanceExtractor {
    downscale_factor: u32,
}

impl LuminanceExtractor {
    pub fn new() -> Self {
        Self {
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
        }
    }

    pub fn with_factor(downscale_factor: u32) -> Result<Self, ScanError> {
        if downscale_factor == 0 {
            return Err(ScanError::Config("downscale factor must be at least 1".into()));
        }
        Ok(Self { downscale_factor })
    }

    pub fn downscale_factor(&self) -> u32 {
        self.downscale_factor
    }

    /// 先按面积平均缩小，再对每个缩小后像素求相对亮度并取均值
    pub fn extract(&self, frame: &Frame) -> f64 {
        let cells = Self::area_downscale(frame, self.downscale_factor);
        let sum: f64 = cells
            .iter()
            .map(|&[b, g, r]| relative_luminance(b, g, r))
            .sum();
        sum / cells.len() as f64
    }

    /// 面积平均缩放，返回每个输出单元的 [B, G, R] 均值。
    ///
    /// 输出尺寸为 `max(1, dim / factor)`。单元边界按比例划分，
    /// 不能整除时余下的行列并入相邻单元，每个源像素恰好计入一个单元。
    fn area_downscale(frame: &Frame, factor: u32) -> Vec<[f64; 3]> {
        let w = frame.width() as usize;
        let h = frame.height() as usize;
        let data = frame.data();
        let factor = factor.max(1) as usize;
        let tw = (w / factor).max(1);
        let th = (h / factor).max(1);

        let mut cells = Vec::with_capacity(tw * th);

        for by in 0..th {
            let y_start = by * h / th;
            let y_end = (by + 1) * h / th;

            for bx in 0..tw {
                let x_start = bx * w / tw;
                let x_end = (bx + 1) * w / tw;

                let mut sums = [0u64; 3];
                for py in y_start..y_end {
                    let row = &data[(py * w + x_start) * 3..(py * w + x_end) * 3];
                    for px in row.chunks_exact(3) {
                        sums[0] += px[0] as u64;
                        sums[1] += px[1] as u64;
                        sums[2] += px[2] as u64;
                    }
                }

                let count = ((y_end - y_start) * (x_end - x_start)) as f64;
                cells.push([
                    sums[0] as f64 / count,
                    sums[1] as f64 / count,
                    sums[2] as f64 / count,
                ]);
            }
        }

        cells
    }
}

impl Default for LuminanceExtractor {
    fn default() -> Self {
        Self::new()
    }
}
