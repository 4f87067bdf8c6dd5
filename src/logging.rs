//! 日志初始化
//!
//! 基于 tracing_subscriber 的 fmt layer，级别来自配置，RUST_LOG 环境变量可以覆盖

use garde::Validate;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// 日志配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// 日志级别: "trace", "debug", "info", "warn", "error"
    #[default = "info"]
    #[garde(length(min = 1))]
    pub level: String,

    /// 是否输出 target
    #[default = true]
    #[garde(skip)]
    pub with_target: bool,

    /// 是否输出 ANSI 颜色
    #[default = true]
    #[garde(skip)]
    pub ansi: bool,
}

impl LogConfig {
    /// 获取日志级别对应的 Level，无法识别时回退到 INFO
    pub fn level(&self) -> Level {
        Level::from_str(self.level.to_lowercase().as_str()).unwrap_or(Level::INFO)
    }

    /// 构建过滤器：RUST_LOG 优先，否则使用配置的级别
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level()).into())
            .from_env_lossy()
    }
}

/// 初始化全局 subscriber
///
/// 多次调用只有第一次生效
pub fn init(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init();
}
