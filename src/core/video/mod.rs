pub mod detector;
pub mod error;
pub mod frame;
pub mod luminance;
pub mod manager;
pub mod signal;
pub mod source;
pub mod store;

pub use detector::{DetectorConfig, Direction, FlashDetector, FlashEvent, OscillationCounter};
pub use error::ScanError;
pub use frame::{Frame, RawFrame};
pub use luminance::LuminanceExtractor;
pub use manager::{ExtractionConfig, ExtractionOutcome, ExtractionStats, SignalExtractorManager};
pub use signal::{BrightnessSignal, BrightnessSignalBuilder};
pub use source::{FrameRead, FrameSource, ImageSequenceSource, MemoryFrameSource};
pub use store::SignalStore;
