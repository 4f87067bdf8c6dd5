//! gRPC 服务实现
//!
//! - echo: Echo 业务服务
//! - health: grpc.health.v1 健康检查服务

pub mod echo;
pub mod health;

pub use echo::{greeting, EchoHandler, SERVER_VERSION};
pub use health::HealthHandler;
