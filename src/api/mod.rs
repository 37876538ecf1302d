pub mod config;
pub mod models;
pub mod video;

pub use config::ScanConfig;
pub use models::report::{ScanReport, ScanStats};
pub use video::FlashScanner;
