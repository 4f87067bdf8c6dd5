use garde::Validate;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::error::Error as StdError;
use std::io;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

use crate::error::ConnectionError;

/// 客户端连接配置，进程生命周期内不变
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// 服务端地址，如 "localhost:50051" 或 "https://echo.example.com:443"
    #[default = "localhost:50051"]
    #[garde(length(min = 1))]
    pub target: String,

    /// 是否启用 TLS
    #[default = false]
    #[garde(skip)]
    pub encrypted: bool,

    /// 信任锚（CA 证书）路径，仅在启用 TLS 时使用
    #[default(Some("ssl/ca.crt".to_string()))]
    #[garde(skip)]
    pub trust_anchor: Option<String>,

    /// 覆盖用于证书校验的服务端域名
    #[garde(skip)]
    pub domain_name: Option<String>,

    /// 延迟到第一次调用时再建立连接
    #[default = false]
    #[garde(skip)]
    pub connect_lazily: bool,
}

impl ConnectionConfig {
    /// 补全 scheme 后的目标 URI
    pub fn endpoint_uri(&self) -> String {
        if self.target.contains("://") {
            self.target.clone()
        } else if self.encrypted {
            format!("https://{}", self.target)
        } else {
            format!("http://{}", self.target)
        }
    }
}

/// 客户端到服务端的长连接
///
/// 克隆共享同一条底层连接，可以被多个请求并发使用
#[derive(Debug, Clone)]
pub struct TransportChannel {
    channel: Channel,
    target: String,
}

impl TransportChannel {
    /// 打开通道
    ///
    /// 启用 TLS 时先读取信任锚，读取失败不会产生任何网络请求
    pub async fn open(config: &ConnectionConfig) -> Result<Self, ConnectionError> {
        let uri = config.endpoint_uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ConnectionError::InvalidTarget(format!("{}: {}", uri, e)))?;

        if config.encrypted {
            endpoint = endpoint
                .tls_config(load_client_tls(config).await?)
                .map_err(|e| ConnectionError::CertificateInvalid(e.to_string()))?;
        }

        let channel = if config.connect_lazily {
            endpoint.connect_lazy()
        } else {
            endpoint
                .connect()
                .await
                .map_err(|e| classify_connect_error(&uri, config.encrypted, e))?
        };

        tracing::info!(target_uri = %uri, encrypted = config.encrypted, "transport channel opened");
        Ok(Self {
            channel,
            target: uri,
        })
    }

    /// 底层 tonic channel
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

async fn load_client_tls(config: &ConnectionConfig) -> Result<ClientTlsConfig, ConnectionError> {
    let path = config.trust_anchor.as_deref().unwrap_or("ssl/ca.crt");
    let pem = tokio::fs::read(path)
        .await
        .map_err(|source| ConnectionError::CertificateFileMissing {
            path: path.to_string(),
            source,
        })?;

    let mut tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));
    if let Some(ref domain) = config.domain_name {
        tls = tls.domain_name(domain.clone());
    }
    Ok(tls)
}

/// TLS 握手失败（rustls 以 InvalidData 上报）归为证书错误，其余归为不可达
fn classify_connect_error(
    target: &str,
    encrypted: bool,
    error: tonic::transport::Error,
) -> ConnectionError {
    if encrypted && is_tls_rejection(&error) {
        return ConnectionError::CertificateInvalid(format!("{}: {}", target, source_chain(&error)));
    }
    ConnectionError::Unreachable {
        target: target.to_string(),
        source: error,
    }
}

fn is_tls_rejection(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::InvalidData {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn source_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut current = error.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.target, "localhost:50051");
        assert!(!config.encrypted);
        assert_eq!(config.trust_anchor.as_deref(), Some("ssl/ca.crt"));
        assert!(config.domain_name.is_none());
        assert!(!config.connect_lazily);
    }

    #[test]
    fn test_endpoint_uri() {
        let mut config = ConnectionConfig::default();
        assert_eq!(config.endpoint_uri(), "http://localhost:50051");

        config.encrypted = true;
        assert_eq!(config.endpoint_uri(), "https://localhost:50051");

        config.target = "http://10.0.0.1:9000".to_string();
        assert_eq!(config.endpoint_uri(), "http://10.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_open_missing_trust_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig {
            target: "127.0.0.1:1".to_string(),
            encrypted: true,
            trust_anchor: Some(dir.path().join("ca.crt").to_string_lossy().to_string()),
            ..Default::default()
        };

        let err = TransportChannel::open(&config).await.unwrap_err();
        assert!(
            matches!(err, ConnectionError::CertificateFileMissing { .. }),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_open_unreachable() {
        // 绑定后立即释放，得到一个没有监听者的端口
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ConnectionConfig {
            target: format!("127.0.0.1:{}", port),
            ..Default::default()
        };

        let err = TransportChannel::open(&config).await.unwrap_err();
        assert!(
            matches!(err, ConnectionError::Unreachable { .. }),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_open_lazily_does_not_connect() {
        let config = ConnectionConfig {
            target: "127.0.0.1:1".to_string(),
            connect_lazily: true,
            ..Default::default()
        };

        let channel = TransportChannel::open(&config).await.unwrap();
        assert_eq!(channel.target(), "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_open_invalid_target() {
        let config = ConnectionConfig {
            target: "not a uri".to_string(),
            connect_lazily: true,
            ..Default::default()
        };

        let err = TransportChannel::open(&config).await.unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidTarget(_)), "unexpected error: {:?}", err);
    }
}
