//! echo-mesh - 一对最小的 gRPC 服务端与 HTTP 网关客户端
//!
//! ## 模块
//!
//! - **transport**: 客户端长连接与服务端监听器，支持明文和 TLS
//! - **service**: Echo 服务与 grpc.health.v1 健康检查服务
//! - **identity**: 从本机网络接口解析服务端对外地址
//! - **gateway**: 把 HTTP 请求转换为 Echo 调用
//! - **config**: 配置加载（文件 + 环境变量）
//! - **logging**: 基于 tracing 的日志初始化

pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod logging;
pub mod proto;
pub mod service;
pub mod transport;

// 重新导出主要的公共 API
pub use config::{ClientConfig, ServerConfig};

pub use error::{ConnectionError, IdentityError, RpcError};

pub use gateway::{Gateway, GatewayConfig, RetryConfig, ERROR_PLACEHOLDER};

pub use identity::{FallbackPolicy, IdentityConfig, IdentityResolver, InterfaceSource};

pub use logging::LogConfig;

pub use service::{EchoHandler, HealthHandler, SERVER_VERSION};

pub use transport::{ConnectionConfig, Listener, ListenerConfig, TransportChannel};
