//! 传输层
//!
//! - channel: 客户端长连接，明文或 TLS
//! - listener: 服务端监听器，明文或 TLS

pub mod channel;
pub mod listener;

pub use channel::{ConnectionConfig, TransportChannel};
pub use listener::{Listener, ListenerConfig};
