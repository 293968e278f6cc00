// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default `PeerTransport`: one short-lived WebSocket round trip per RPC,
//! dialed against a peer's configured URL. Grounded in the teacher's
//! `connect_ws`/`event_bridge` pair, simplified to a request/response shape
//! since §1 leaves the wire format unconstrained ("any transport satisfying
//! the duplex-channel contract works").

use crate::error::ProxyError;
use crate::peer_transport::PeerTransport;
use crate::protocol::ProcessPayload;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_tungstenite::tungstenite::Message;

/// A peer's outbound RPC, serialized as a single WebSocket text frame.
#[derive(Serialize)]
struct WireRequest<'a> {
    method: &'a str,
    namespec: Option<&'a str>,
    extra_args: Option<&'a str>,
}

/// The peer's reply, read as the next text frame on the same connection.
#[derive(Deserialize)]
struct WireResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    authorized: bool,
    #[serde(default)]
    processes: Vec<ProcessPayload>,
}

/// Dials `ws://.../supvisors` on each call, keyed by node identifier (§6:
/// peers are addressed by identifier, never by raw URL, everywhere above
/// this module).
pub struct WsPeerTransport {
    urls: HashMap<String, String>,
}

impl WsPeerTransport {
    pub fn new(urls: HashMap<String, String>) -> Self {
        Self { urls }
    }

    fn url_for(&self, identifier: &str) -> Result<&str, ProxyError> {
        self.urls.get(identifier).map(String::as_str).ok_or_else(|| ProxyError::Connection {
            identifier: identifier.to_string(),
            source: format!("no websocket url configured for {identifier}").into(),
        })
    }

    async fn call(&self, identifier: &str, request: WireRequest<'_>) -> Result<WireResponse, ProxyError> {
        let url = self.url_for(identifier)?;
        let (mut stream, _) = tokio_tungstenite::connect_async(url).await.map_err(|e| ProxyError::Connection {
            identifier: identifier.to_string(),
            source: Box::new(e),
        })?;

        let body = serde_json::to_string(&request).map_err(|e| ProxyError::Connection {
            identifier: identifier.to_string(),
            source: Box::new(e),
        })?;
        stream.send(Message::Text(body)).await.map_err(|e| ProxyError::Connection {
            identifier: identifier.to_string(),
            source: Box::new(e),
        })?;

        let reply = loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(ProxyError::Connection { identifier: identifier.to_string(), source: Box::new(e) });
                }
                None => {
                    return Err(ProxyError::Connection {
                        identifier: identifier.to_string(),
                        source: "connection closed before a reply arrived".into(),
                    });
                }
            }
        };
        let _ = stream.close(None).await;

        let response: WireResponse = serde_json::from_str(&reply).map_err(|e| ProxyError::Connection {
            identifier: identifier.to_string(),
            source: Box::new(e),
        })?;
        if !response.ok {
            return Err(ProxyError::Connection {
                identifier: identifier.to_string(),
                source: response.error.unwrap_or_else(|| "peer reported failure".to_string()).into(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PeerTransport for WsPeerTransport {
    async fn check_instance(&self, identifier: &str) -> Result<bool, ProxyError> {
        let response = self.call(identifier, WireRequest { method: "check_instance", namespec: None, extra_args: None }).await?;
        Ok(response.authorized)
    }

    async fn get_all_process_info(&self, identifier: &str) -> Result<Vec<ProcessPayload>, ProxyError> {
        let response = self.call(identifier, WireRequest { method: "get_all_process_info", namespec: None, extra_args: None }).await?;
        Ok(response.processes)
    }

    async fn start_process(&self, identifier: &str, namespec: &str, extra_args: Option<&str>) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "start_process", namespec: Some(namespec), extra_args }).await?;
        Ok(())
    }

    async fn stop_process(&self, identifier: &str, namespec: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "stop_process", namespec: Some(namespec), extra_args: None }).await?;
        Ok(())
    }

    async fn restart(&self, identifier: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "restart", namespec: None, extra_args: None }).await?;
        Ok(())
    }

    async fn shutdown(&self, identifier: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "shutdown", namespec: None, extra_args: None }).await?;
        Ok(())
    }

    async fn restart_sequence(&self, identifier: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "restart_sequence", namespec: None, extra_args: None }).await?;
        Ok(())
    }

    async fn restart_all(&self, identifier: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "restart_all", namespec: None, extra_args: None }).await?;
        Ok(())
    }

    async fn shutdown_all(&self, identifier: &str) -> Result<(), ProxyError> {
        self.call(identifier, WireRequest { method: "shutdown_all", namespec: None, extra_args: None }).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ws_transport_tests.rs"]
mod tests;
