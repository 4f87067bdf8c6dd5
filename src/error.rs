use thiserror::Error;

/// 连接建立阶段的错误
///
/// 只在启动时产生（打开通道或开始监听），由调用方决定是否终止进程
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("目标不可达: {target}")]
    Unreachable {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("服务端证书校验失败: {0}")]
    CertificateInvalid(String),

    #[error("信任锚文件不可读: {path}")]
    CertificateFileMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("证书加载失败: {0}")]
    CertificateLoadFailed(String),

    #[error("无效的目标地址: {0}")]
    InvalidTarget(String),

    #[error("监听失败: {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// 服务端身份解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("枚举网络接口失败: {0}")]
    Enumeration(String),

    #[error("没有可用的网络地址")]
    Unavailable,
}

/// 单次 RPC 调用失败（传输错误、服务端错误、超时）
///
/// 由网关吸收，不会暴露给 HTTP 调用方
pub type RpcError = tonic::Status;
