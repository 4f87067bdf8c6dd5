fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 编译 echo.proto 和 health.proto，使用 tonic-prost-build 生成 gRPC 客户端与服务端代码
    tonic_prost_build::configure()
        .compile_protos(&["proto/echo.proto", "proto/health.proto"], &["proto/"])?;

    // 告诉 cargo 当 proto 文件发生变化时重新构建
    println!("cargo:rerun-if-changed=proto/");

    Ok(())
}
