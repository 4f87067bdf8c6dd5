use garde::Validate;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};

use crate::error::ConnectionError;
use crate::proto::echo::echo_service_server::EchoServiceServer;
use crate::proto::health::health_server::HealthServer;
use crate::service::{EchoHandler, HealthHandler};

/// 服务端监听配置
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// 监听地址
    #[default = "0.0.0.0"]
    #[garde(length(min = 1))]
    pub host: String,

    /// 监听端口，0 表示由系统分配
    #[default = 50051]
    #[garde(skip)]
    pub port: u16,

    /// 是否启用 TLS
    #[default = false]
    #[garde(skip)]
    pub encrypted: bool,

    /// 服务端证书路径
    #[default = "ssl/server.crt"]
    #[garde(length(min = 1))]
    pub cert_path: String,

    /// 服务端私钥路径
    #[default = "ssl/server.pem"]
    #[garde(length(min = 1))]
    pub key_path: String,
}

/// 已绑定端口的 gRPC 监听器
pub struct Listener {
    listener: TcpListener,
    server: Server,
    local_addr: SocketAddr,
}

impl Listener {
    /// 加载证书（如果启用 TLS）并绑定端口
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ConnectionError> {
        let mut server = Server::builder();
        if config.encrypted {
            server = server
                .tls_config(load_server_tls(config).await?)
                .map_err(|e| ConnectionError::CertificateLoadFailed(e.to_string()))?;
        }

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ConnectionError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ConnectionError::Bind { addr, source })?;

        tracing::info!(%local_addr, encrypted = config.encrypted, "listener bound");
        Ok(Self {
            listener,
            server,
            local_addr,
        })
    }

    /// 实际监听的地址
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 注册 Echo 和 Health 服务并运行，直到 shutdown 完成
    pub async fn serve<F>(self, echo: EchoHandler, shutdown: F) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()> + Send,
    {
        let mut server = self.server;
        server
            .add_service(EchoServiceServer::new(echo))
            .add_service(HealthServer::new(HealthHandler))
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), shutdown)
            .await
    }
}

async fn load_server_tls(config: &ListenerConfig) -> Result<ServerTlsConfig, ConnectionError> {
    let cert = tokio::fs::read(&config.cert_path).await.map_err(|e| {
        ConnectionError::CertificateLoadFailed(format!("{}: {}", config.cert_path, e))
    })?;
    let key = tokio::fs::read(&config.key_path).await.map_err(|e| {
        ConnectionError::CertificateLoadFailed(format!("{}: {}", config.key_path, e))
    })?;
    Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}
