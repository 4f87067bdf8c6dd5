use tonic::{Request, Response, Status};

use crate::identity::IdentityResolver;
use crate::proto::echo::echo_service_server::EchoService;
use crate::proto::echo::{EchoRequest, EchoResponse};

/// 服务端版本，写入每一条 Echo 响应
pub const SERVER_VERSION: &str = "0.9";

/// 构造问候语
pub fn greeting(name: &str, address: &str, version: &str) -> String {
    format!("Hello, {}-san! (Said {}, Version {})", name, address, version)
}

/// Echo 服务
///
/// 无状态，每次调用都重新解析服务端地址
#[derive(Debug, Clone)]
pub struct EchoHandler {
    identity: IdentityResolver,
}

impl EchoHandler {
    pub fn new(identity: IdentityResolver) -> Self {
        Self { identity }
    }
}

#[tonic::async_trait]
impl EchoService for EchoHandler {
    async fn echo(&self, request: Request<EchoRequest>) -> Result<Response<EchoResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(name = %req.name, "Echo was called");

        let message = greeting(&req.name, &self.identity.resolve_address(), SERVER_VERSION);
        Ok(Response::new(EchoResponse { message }))
    }
}
