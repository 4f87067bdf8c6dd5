//! HTTP 网关
//!
//! 把 HTTP 请求中的 name 参数转换为一次 Echo 调用，结果以纯文本写回。
//! RPC 失败不会变成 HTTP 错误码，响应体固定为 "(Error)"。

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::routing::any;
use axum::Router;
use backon::{ConstantBuilder, Retryable};
use garde::Validate;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tonic::transport::Channel;
use tonic::Request;
use tower_http::trace::TraceLayer;

use crate::config::duration::{serde_as, HumanDur};
use crate::error::RpcError;
use crate::proto::echo::echo_service_client::EchoServiceClient;
use crate::proto::echo::EchoRequest;
use crate::transport::TransportChannel;

/// RPC 失败时写回的占位响应
pub const ERROR_PLACEHOLDER: &str = "(Error)";

/// 成功响应的前缀
pub const RESPONSE_PREFIX: &str = "Response from the server: ";

/// 重试配置
///
/// 默认不重试，每个 HTTP 请求只发起一次调用
#[serde_as]
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// 首次调用失败后的最大重试次数
    #[default = 0]
    #[garde(range(max = 10))]
    pub max_times: usize,

    /// 两次尝试之间的固定间隔
    #[serde_as(as = "HumanDur")]
    #[default(Duration::from_millis(100))]
    #[garde(skip)]
    pub delay: Duration,
}

/// 网关配置
#[serde_as]
#[derive(Debug, Clone, Deserialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP 监听地址
    #[default = "0.0.0.0"]
    #[garde(length(min = 1))]
    pub host: String,

    /// HTTP 监听端口
    #[default = 8080]
    #[garde(skip)]
    pub port: u16,

    /// 重试策略
    #[garde(dive)]
    pub retry: RetryConfig,

    /// 单次调用的超时时间，不设置则一直等待
    #[serde_as(as = "Option<HumanDur>")]
    #[garde(skip)]
    pub request_timeout: Option<Duration>,
}

/// HTTP 网关，持有共享的 Echo 客户端
#[derive(Debug, Clone)]
pub struct Gateway {
    client: EchoServiceClient<Channel>,
    retry: RetryConfig,
    request_timeout: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
struct EchoParams {
    #[serde(default)]
    name: Option<String>,
}

impl Gateway {
    pub fn new(channel: &TransportChannel, config: &GatewayConfig) -> Self {
        Self {
            client: EchoServiceClient::new(channel.channel()),
            retry: config.retry.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// 调用 Echo 并生成响应体
    pub async fn handle(&self, name: &str) -> String {
        match self.echo(name).await {
            Ok(message) => {
                tracing::info!(%message, "Message received");
                format!("{}{}", RESPONSE_PREFIX, message)
            }
            Err(status) => {
                tracing::warn!(code = ?status.code(), message = %status.message(), "echo call failed");
                ERROR_PLACEHOLDER.to_string()
            }
        }
    }

    /// 调用 Echo，按重试配置最多尝试 max_times + 1 次
    pub async fn echo(&self, name: &str) -> Result<String, RpcError> {
        let backoff = ConstantBuilder::default()
            .with_delay(self.retry.delay)
            .with_max_times(self.retry.max_times);

        (|| self.echo_once(name))
            .retry(backoff)
            .notify(|status: &RpcError, delay: Duration| {
                tracing::warn!(code = ?status.code(), ?delay, "retrying echo call");
            })
            .await
    }

    async fn echo_once(&self, name: &str) -> Result<String, RpcError> {
        let mut client = self.client.clone();
        let call = client.echo(Request::new(EchoRequest {
            name: name.to_string(),
        }));

        let response = match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| RpcError::deadline_exceeded("echo call timed out"))??,
            None => call.await?,
        };
        Ok(response.into_inner().message)
    }

    /// 构建路由，所有路径都交给同一个处理器
    pub fn router(self) -> Router {
        Router::new()
            .route("/", any(handle_echo))
            .fallback(handle_echo)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(self))
    }

    /// 在给定监听器上运行，直到 shutdown 完成
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// 表单参数优先于查询参数，缺省为空字符串
async fn handle_echo(
    State(gateway): State<Arc<Gateway>>,
    query: Result<Query<EchoParams>, QueryRejection>,
    form: Result<Form<EchoParams>, FormRejection>,
) -> String {
    let name = form
        .ok()
        .and_then(|Form(params)| params.name)
        .or_else(|| query.ok().and_then(|Query(params)| params.name))
        .unwrap_or_default();
    gateway.handle(&name).await
}
