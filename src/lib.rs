//! 视频光敏闪烁检测
//!
//! 每帧归约为一个平均相对亮度值，再按一秒窗口统计显著的明暗反转，
//! 标记可能诱发光敏反应的时间段。

pub mod api;
pub mod core;

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("flash_scan"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // 重复调用时忽略
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}
