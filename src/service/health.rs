use futures::Stream;
use std::pin::Pin;
use tonic::{Request, Response, Status};

use crate::proto::health::health_check_response::ServingStatus;
use crate::proto::health::health_server::Health;
use crate::proto::health::{HealthCheckRequest, HealthCheckResponse};

/// 健康检查服务
///
/// Check 只代表进程存活，总是返回 SERVING；Watch 不支持
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthHandler;

#[tonic::async_trait]
impl Health for HealthHandler {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        tracing::info!(service = %request.get_ref().service, "Received Check request");
        Ok(Response::new(HealthCheckResponse {
            status: ServingStatus::Serving.into(),
        }))
    }

    type WatchStream =
        Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send + 'static>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        tracing::info!(service = %request.get_ref().service, "Received Watch request");
        Err(Status::unimplemented("unimplemented"))
    }
}
