use super::error::ScanError;
use image::RgbImage;

/// 帧数据结构
///
/// 像素按解码器原生的 B、G、R 顺序排列，每像素 3 字节。
/// 字段只能经由 `Frame::new` 写入，缓冲区长度恒等于 `width * height * 3`。
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>, // BGR 格式
    frame_number: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, frame_number: u64) -> Result<Self, ScanError> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidFrame(format!(
                "frame {} has empty size {}x{}",
                frame_number, width, height
            )));
        }

        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(ScanError::InvalidFrame(format!(
                "frame {} has {} bytes, expected {} for {}x{} BGR",
                frame_number,
                data.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            data,
            frame_number,
        })
    }

    /// 纯色帧，`bgr` 为 [B, G, R]
    pub fn solid(width: u32, height: u32, bgr: [u8; 3], frame_number: u64) -> Result<Self, ScanError> {
        let data = bgr
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(width, height, data, frame_number)
    }

    /// 从 `image` 的 RGB 图像构造，通道重排为 BGR
    pub fn from_rgb_image(img: &RgbImage, frame_number: u64) -> Result<Self, ScanError> {
        let mut data = Vec::with_capacity(img.width() as usize * img.height() as usize * 3);
        for pixel in img.pixels() {
            let [r, g, b] = pixel.0;
            data.push(b);
            data.push(g);
            data.push(r);
        }
        Self::new(img.width(), img.height(), data, frame_number)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// BGR 像素数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// (x, y) 处像素的 (B, G, R)；越界返回 None
    pub fn bgr_at(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        let idx = (y * self.width as usize + x) * 3;
        Some((self.data[idx], self.data[idx + 1], self.data[idx + 2]))
    }
}

/// 从原生层传递的原始帧数据（YUV 4:2:0 平面）
#[derive(Debug)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
    pub frame_number: u64,
}

impl RawFrame {
    pub fn to_bgr(&self) -> Result<Frame, ScanError> {
        let w = self.width as usize;
        let h = self.height as usize;
        let chroma_w = (w + 1) / 2;
        let chroma_h = (h + 1) / 2;

        if self.y_plane.len() < w * h
            || self.u_plane.len() < chroma_w * chroma_h
            || self.v_plane.len() < chroma_w * chroma_h
        {
            return Err(ScanError::InvalidFrame(format!(
                "raw frame {} planes too small for {}x{}",
                self.frame_number, w, h
            )));
        }

        let mut bgr_data = vec![0u8; w * h * 3];

        for y in 0..h {
            for x in 0..w {
                let y_idx = y * w + x;
                let uv_idx = (y / 2) * chroma_w + x / 2;

                let y_val = self.y_plane[y_idx] as f32;
                let u_val = self.u_plane[uv_idx] as f32 - 128.0;
                let v_val = self.v_plane[uv_idx] as f32 - 128.0;

                let r = (y_val + 1.402 * v_val).clamp(0.0, 255.0) as u8;
                let g = (y_val - 0.344136 * u_val - 0.714136 * v_val).clamp(0.0, 255.0) as u8;
                let b = (y_val + 1.772 * u_val).clamp(0.0, 255.0) as u8;

                let bgr_idx = y_idx * 3;
                bgr_data[bgr_idx] = b;
                bgr_data[bgr_idx + 1] = g;
                bgr_data[bgr_idx + 2] = r;
            }
        }

        Frame::new(self.width, self.height, bgr_data, self.frame_number)
    }
}
