//! 配置加载
//!
//! 优先级从低到高：结构体默认值 < 配置文件 < 环境变量 < 命令行参数（由二进制处理）。
//! 配置文件根据扩展名选择解析器，支持 JSON/JSON5/YAML/TOML。

pub mod duration;

use anyhow::{anyhow, Context, Result};
use garde::Validate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::path::Path;

use crate::gateway::GatewayConfig;
use crate::identity::IdentityConfig;
use crate::logging::LogConfig;
use crate::transport::{ConnectionConfig, ListenerConfig};

/// 服务端配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    #[garde(dive)]
    pub listener: ListenerConfig,

    #[garde(dive)]
    pub identity: IdentityConfig,

    #[garde(dive)]
    pub log: LogConfig,
}

/// 客户端（HTTP 网关）配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    #[garde(dive)]
    pub channel: ConnectionConfig,

    #[garde(dive)]
    pub gateway: GatewayConfig,

    #[garde(dive)]
    pub log: LogConfig,
}

impl ServerConfig {
    /// 加载配置文件（可选）并应用环境变量
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = match path {
            Some(path) => load_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        garde::Validate::validate(&config)?;
        Ok(config)
    }

    /// 环境变量覆盖: PORT, ECHO_TLS, ADVERTISE_ADDRESS, LOG_LEVEL
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.listener.port = parse_port("PORT", &port)?;
        }
        if let Some(tls) = lookup("ECHO_TLS") {
            self.listener.encrypted = parse_bool("ECHO_TLS", &tls)?;
        }
        if let Some(address) = lookup("ADVERTISE_ADDRESS") {
            self.identity.advertise_address = Some(address);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }
}

impl ClientConfig {
    /// 加载配置文件（可选）并应用环境变量
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = match path {
            Some(path) => load_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        garde::Validate::validate(&config)?;
        Ok(config)
    }

    /// 环境变量覆盖: ECHO_HOST, PORT, ECHO_TLS, LOG_LEVEL
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ECHO_HOST") {
            self.channel.target = host;
        }
        if let Some(port) = lookup("PORT") {
            self.gateway.port = parse_port("PORT", &port)?;
        }
        if let Some(tls) = lookup("ECHO_TLS") {
            self.channel.encrypted = parse_bool("ECHO_TLS", &tls)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }
}

/// 从文件加载配置，根据扩展名选择解析器
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let config = match ext.as_str() {
        "json" => serde_json::from_str(&content)?,
        "json5" => json5::from_str(&content)?,
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => return Err(anyhow!("不支持的文件格式: {}", path.display())),
    };
    Ok(config)
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} 不是合法端口: {}", key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(anyhow!("{} 不是合法布尔值: {}", key, value)),
    }
}
