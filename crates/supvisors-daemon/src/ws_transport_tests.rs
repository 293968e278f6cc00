use super::*;
use tokio::net::TcpListener;

/// Binds an ephemeral port, accepts exactly one WebSocket connection, reads
/// one request frame and replies with `response`, then closes.
async fn spawn_single_shot_server(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
                if let Some(Ok(Message::Text(_))) = ws.next().await {
                    let _ = ws.send(Message::Text(response.to_string())).await;
                }
                let _ = ws.close(None).await;
            }
        }
    });
    format!("ws://{addr}")
}

#[tokio::test]
async fn check_instance_parses_authorized_reply() {
    let url = spawn_single_shot_server(r#"{"ok":true,"authorized":true}"#).await;
    let mut urls = HashMap::new();
    urls.insert("A".to_string(), url);
    let transport = WsPeerTransport::new(urls);

    let authorized = transport.check_instance("A").await.expect("rpc succeeds");
    assert!(authorized);
}

#[tokio::test]
async fn get_all_process_info_parses_process_list() {
    let body = r#"{"ok":true,"processes":[{"namespec":"app:p1","state":"running","uptime":3,"expected_exit":false,"pid":7}]}"#;
    let url = spawn_single_shot_server(body).await;
    let mut urls = HashMap::new();
    urls.insert("A".to_string(), url);
    let transport = WsPeerTransport::new(urls);

    let processes = transport.get_all_process_info("A").await.expect("rpc succeeds");
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0].namespec, "app:p1");
}

#[tokio::test]
async fn unknown_identifier_is_a_connection_error() {
    let transport = WsPeerTransport::new(HashMap::new());
    let err = transport.check_instance("missing").await.unwrap_err();
    assert!(matches!(err, ProxyError::Connection { .. }));
}

#[tokio::test]
async fn peer_failure_reply_surfaces_as_connection_error() {
    let url = spawn_single_shot_server(r#"{"ok":false,"error":"denied"}"#).await;
    let mut urls = HashMap::new();
    urls.insert("A".to_string(), url);
    let transport = WsPeerTransport::new(urls);

    let err = transport.check_instance("A").await.unwrap_err();
    assert!(matches!(err, ProxyError::Connection { .. }));
}
