//! 由 build.rs 生成的 protobuf / gRPC 代码

/// Echo 服务
pub mod echo {
    include!(concat!(env!("OUT_DIR"), "/echo.rs"));
}

/// 标准 gRPC 健康检查协议 (grpc.health.v1)
pub mod health {
    include!(concat!(env!("OUT_DIR"), "/grpc.health.v1.rs"));
}
