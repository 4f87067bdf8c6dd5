//! 服务端身份解析
//!
//! 从本机网络接口中挑选一个对外可见的地址，用于标记 Echo 响应

use garde::Validate;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::net::IpAddr;
use std::sync::Arc;

use crate::error::IdentityError;

/// 无法确定地址时使用的字面值
pub const UNKNOWN_ADDRESS: &str = "UNKNOWN";

/// 没有非回环 IPv4 地址时的回退策略
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// 返回枚举结果中的第一个地址（可能是回环或 IPv6）
    #[default]
    FirstAddress,
    /// 返回 "UNKNOWN"
    Unknown,
}

/// 身份解析配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// 固定对外地址，设置后跳过接口枚举
    #[garde(skip)]
    pub advertise_address: Option<String>,

    /// 回退策略
    #[garde(skip)]
    pub fallback: FallbackPolicy,
}

/// 网络接口地址来源
pub trait InterfaceSource: Send + Sync {
    /// 按系统顺序列出本机所有接口地址
    fn addresses(&self) -> Result<Vec<IpAddr>, IdentityError>;
}

/// 基于 local-ip-address 的系统接口枚举
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn addresses(&self) -> Result<Vec<IpAddr>, IdentityError> {
        let interfaces = local_ip_address::list_afinet_netifas()
            .map_err(|e| IdentityError::Enumeration(e.to_string()))?;
        Ok(interfaces.into_iter().map(|(_, ip)| ip).collect())
    }
}

/// 服务端身份解析器
///
/// 每次调用都重新枚举接口，不做缓存
#[derive(Clone)]
pub struct IdentityResolver {
    source: Arc<dyn InterfaceSource>,
    config: IdentityConfig,
}

impl IdentityResolver {
    /// 使用系统接口创建解析器
    pub fn new(config: IdentityConfig) -> Self {
        Self::with_source(config, Arc::new(SystemInterfaces))
    }

    /// 使用自定义接口来源创建解析器
    pub fn with_source(config: IdentityConfig, source: Arc<dyn InterfaceSource>) -> Self {
        Self { source, config }
    }

    /// 解析对外地址
    ///
    /// 枚举失败或没有任何地址时返回 "UNKNOWN"
    pub fn resolve_address(&self) -> String {
        match self.try_resolve() {
            Ok(address) => address,
            Err(IdentityError::Enumeration(e)) => {
                tracing::debug!("枚举网络接口失败: {}", e);
                UNKNOWN_ADDRESS.to_string()
            }
            Err(IdentityError::Unavailable) => {
                tracing::warn!("没有可用的网络地址，使用 {}", UNKNOWN_ADDRESS);
                UNKNOWN_ADDRESS.to_string()
            }
        }
    }

    /// 解析对外地址，保留失败原因
    pub fn try_resolve(&self) -> Result<String, IdentityError> {
        if let Some(ref address) = self.config.advertise_address {
            return Ok(address.clone());
        }
        let addresses = self.source.addresses()?;
        select_address(&addresses, self.config.fallback)
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("config", &self.config)
            .finish()
    }
}

/// 从地址列表中选出第一个非回环 IPv4 地址
///
/// IPv4 映射的 IPv6 地址（::ffff:a.b.c.d）按 IPv4 处理
pub fn select_address(
    addresses: &[IpAddr],
    fallback: FallbackPolicy,
) -> Result<String, IdentityError> {
    let found = addresses.iter().find_map(|ip| match ip.to_canonical() {
        IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
        _ => None,
    });
    if let Some(v4) = found {
        return Ok(v4.to_string());
    }

    let first = addresses.first().ok_or(IdentityError::Unavailable)?;
    match fallback {
        FallbackPolicy::FirstAddress => Ok(first.to_string()),
        FallbackPolicy::Unknown => Ok(UNKNOWN_ADDRESS.to_string()),
    }
}
