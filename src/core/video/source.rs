use super::error::ScanError;
use super::frame::Frame;
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// 一次读取的结果
#[derive(Debug)]
pub enum FrameRead {
    Frame(Frame),
    /// 流尚未结束但本次没有取到帧数据
    Missing,
    End,
}

/// 有序帧来源（本地文件、网络流等由实现方负责）
pub trait FrameSource: Send {
    /// 整个流使用同一个帧率
    fn frame_rate(&self) -> f64;

    /// 可能阻塞在 I/O 上
    fn read_frame(&mut self) -> FrameRead;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_rate(&self) -> f64 {
        (**self).frame_rate()
    }

    fn read_frame(&mut self) -> FrameRead {
        (**self).read_frame()
    }
}

/// 内存帧来源，可模拟中途解码失败
pub struct MemoryFrameSource {
    frame_rate: f64,
    frames: VecDeque<Frame>,
    missing_at: Option<usize>,
    position: usize,
}

impl MemoryFrameSource {
    pub fn new(frame_rate: f64, frames: Vec<Frame>) -> Self {
        Self {
            frame_rate,
            frames: frames.into(),
            missing_at: None,
            position: 0,
        }
    }

    /// 第 `index` 次读取返回 [`FrameRead::Missing`]
    pub fn with_missing_at(mut self, index: usize) -> Self {
        self.missing_at = Some(index);
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn read_frame(&mut self) -> FrameRead {
        if self.missing_at == Some(self.position) {
            self.position += 1;
            return FrameRead::Missing;
        }
        self.position += 1;

        match self.frames.pop_front() {
            Some(frame) => FrameRead::Frame(frame),
            None => FrameRead::End,
        }
    }
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// 目录中的图片序列，按文件名排序逐帧解码
pub struct ImageSequenceSource {
    frame_rate: f64,
    paths: VecDeque<PathBuf>,
    next_frame_number: u64,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>, frame_rate: f64) -> Result<Self, ScanError> {
        let dir = dir.as_ref();
        info!("📂 Opening image sequence: {:?}", dir);

        let entries = std::fs::read_dir(dir).map_err(|e| {
            error!("❌ Cannot read image directory {:?}: {}", dir, e);
            ScanError::SourceUnavailable(format!("{}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && Self::is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            error!("❌ No image frames found in {:?}", dir);
            return Err(ScanError::SourceUnavailable(format!(
                "no image frames in {}",
                dir.display()
            )));
        }

        info!("✓ Found {} frames at {} fps", paths.len(), frame_rate);
        Ok(Self {
            frame_rate,
            paths: paths.into(),
            next_frame_number: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    fn decode(path: &Path, frame_number: u64) -> Result<Frame, ScanError> {
        let img = image::open(path)?.to_rgb8();
        Frame::from_rgb_image(&img, frame_number)
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn read_frame(&mut self) -> FrameRead {
        let Some(path) = self.paths.pop_front() else {
            return FrameRead::End;
        };

        let frame_number = self.next_frame_number;
        self.next_frame_number += 1;

        match Self::decode(&path, frame_number) {
            Ok(frame) => {
                debug!("Decoded frame {} from {:?}", frame_number, path);
                FrameRead::Frame(frame)
            }
            Err(e) => {
                warn!("⚠️ Failed to decode {:?}: {}", path, e);
                FrameRead::Missing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(n: u64) -> Frame {
        Frame::solid(8, 8, [n as u8, 0, 0], n).unwrap()
    }

    #[test]
    fn test_memory_source_order() {
        let mut source = MemoryFrameSource::new(25.0, (0..3).map(solid).collect());
        assert_eq!(source.frame_rate(), 25.0);

        for expected in 0..3 {
            match source.read_frame() {
                FrameRead::Frame(frame) => assert_eq!(frame.frame_number(), expected),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(matches!(source.read_frame(), FrameRead::End));
    }

    #[test]
    fn test_memory_source_missing() {
        let mut source = MemoryFrameSource::new(25.0, (0..3).map(solid).collect()).with_missing_at(1);

        assert!(matches!(source.read_frame(), FrameRead::Frame(_)));
        assert!(matches!(source.read_frame(), FrameRead::Missing));
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_image_sequence_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("002.png", 20u8), ("000.png", 0), ("001.png", 10)] {
            RgbImage::from_pixel(4, 4, Rgb([value, value, value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert_eq!(source.len(), 3);

        for expected in [0u8, 10, 20] {
            match source.read_frame() {
                FrameRead::Frame(frame) => {
                    assert_eq!(frame.bgr_at(0, 0), Some((expected, expected, expected)))
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(matches!(source.read_frame(), FrameRead::End));
    }

    #[test]
    fn test_image_sequence_corrupt_frame() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save(dir.path().join("000.png"))
            .unwrap();
        std::fs::write(dir.path().join("001.png"), b"not a png").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert!(matches!(source.read_frame(), FrameRead::Frame(_)));
        assert!(matches!(source.read_frame(), FrameRead::Missing));
    }

    #[test]
    fn test_image_sequence_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), 30.0),
            Err(ScanError::SourceUnavailable(_))
        ));
        assert!(matches!(
            ImageSequenceSource::open(dir.path().join("nope"), 30.0),
            Err(ScanError::SourceUnavailable(_))
        ));
    }
}
