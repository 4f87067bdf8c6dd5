use echo_mesh::{
    ConnectionConfig, ConnectionError, EchoHandler, Gateway, GatewayConfig, IdentityConfig,
    IdentityResolver, Listener, ListenerConfig, TransportChannel,
};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// 测试证书：ca.crt 签发了 server.crt（SAN: localhost, 127.0.0.1），other_ca.crt 无关
fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/tls/{}", env!("CARGO_MANIFEST_DIR"), name)
}

async fn start_tls_server() -> (SocketAddr, oneshot::Sender<()>) {
    let listener = Listener::bind(&ListenerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        encrypted: true,
        cert_path: fixture("server.crt"),
        key_path: fixture("server.pem"),
    })
    .await
    .unwrap();
    let addr = listener.local_addr();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let echo = EchoHandler::new(IdentityResolver::new(IdentityConfig {
        advertise_address: Some("1.2.3.4".to_string()),
        ..Default::default()
    }));
    tokio::spawn(listener.serve(echo, async {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx)
}

fn tls_config(addr: SocketAddr, trust_anchor: String) -> ConnectionConfig {
    ConnectionConfig {
        target: addr.to_string(),
        encrypted: true,
        trust_anchor: Some(trust_anchor),
        domain_name: Some("localhost".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_tls_round_trip() {
    let (addr, _stop) = start_tls_server().await;

    let channel = TransportChannel::open(&tls_config(addr, fixture("ca.crt")))
        .await
        .unwrap();
    assert!(channel.target().starts_with("https://"));

    let gateway = Gateway::new(&channel, &GatewayConfig::default());
    assert_eq!(
        gateway.handle("Taro").await,
        "Response from the server: Hello, Taro-san! (Said 1.2.3.4, Version 0.9)"
    );
}

#[tokio::test]
async fn test_tls_wrong_trust_anchor() {
    let (addr, _stop) = start_tls_server().await;

    let err = TransportChannel::open(&tls_config(addr, fixture("other_ca.crt")))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ConnectionError::CertificateInvalid(_)),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_tls_garbage_trust_anchor() {
    let (addr, _stop) = start_tls_server().await;
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("ca.crt");
    std::fs::write(&garbage, "-----BEGIN CERTIFICATE-----\nnot base64\n-----END CERTIFICATE-----\n")
        .unwrap();

    let err = TransportChannel::open(&tls_config(addr, garbage.to_string_lossy().to_string()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ConnectionError::CertificateInvalid(_)),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_plain_client_against_tls_server_fails() {
    let (addr, _stop) = start_tls_server().await;

    let channel = TransportChannel::open(&ConnectionConfig {
        target: addr.to_string(),
        connect_lazily: true,
        ..Default::default()
    })
    .await
    .unwrap();
    let gateway = Gateway::new(&channel, &GatewayConfig::default());
    assert!(gateway.echo("Taro").await.is_err());
}
