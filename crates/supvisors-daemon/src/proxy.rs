// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outbound half of §4.8: a non-blocking queue the control thread
//! pushes onto, drained by a background worker against a [`PeerTransport`]
//! (§5's control-thread/worker-context split). Implements
//! [`supvisors_engine::RequestSink`] so `supvisors-engine`'s job engines
//! and FSM are generic over it.

use crate::peer_transport::PeerTransport;
use crate::protocol::{OutboundRequest, OutboundRequestKind, PeerEvent, ProcessPayload};
use std::sync::Arc;
use std::time::Duration;
use supvisors_engine::RequestSink;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// SPEC_FULL supplemented feature 2: bounds how many outbound requests the
/// worker drains per pass, so one slow peer cannot starve the others.
const DRAIN_BATCH: usize = 32;

/// The control-thread-facing handle. Cloning shares the same outbound
/// queue and worker.
#[derive(Clone)]
pub struct Proxy {
    outbound_tx: mpsc::UnboundedSender<OutboundRequest>,
}

/// Owns the background worker's shutdown signal and join handle; dropped
/// by [`Proxy::shutdown`] (SPEC_FULL supplemented feature 5).
pub struct ProxyHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    worker: Option<tokio::task::JoinHandle<()>>,
}

impl Proxy {
    /// Spawns the background worker and returns the [`Proxy`] handle
    /// (implements [`RequestSink`]) plus the [`ProxyHandle`] used to shut
    /// it down gracefully later.
    pub fn spawn(
        transport: Arc<dyn PeerTransport>,
        inbound_tx: mpsc::Sender<PeerEvent>,
        rpc_timeout: Duration,
    ) -> (Self, ProxyHandle) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = tokio::spawn(worker_loop(transport, outbound_rx, inbound_tx, rpc_timeout, shutdown_rx));
        (Self { outbound_tx }, ProxyHandle { shutdown_tx: Some(shutdown_tx), worker: Some(worker) })
    }

    fn send(&self, request: OutboundRequest) {
        if self.outbound_tx.send(request).is_err() {
            warn!("outbound queue closed, dropping request");
        }
    }
}

impl RequestSink for Proxy {
    fn push_check_instance(&self, identifier: &str) {
        self.send(OutboundRequest::check_instance(identifier));
    }

    fn push_start_process(&self, identifier: &str, namespec: &str, extra_args: Option<&str>) {
        self.send(OutboundRequest::start_process(identifier, namespec, extra_args));
    }

    fn push_stop_process(&self, identifier: &str, namespec: &str) {
        self.send(OutboundRequest::stop_process(identifier, namespec));
    }

    fn push_restart(&self, identifier: &str) {
        self.send(OutboundRequest::simple(OutboundRequestKind::Restart, identifier));
    }

    fn push_shutdown(&self, identifier: &str) {
        self.send(OutboundRequest::simple(OutboundRequestKind::Shutdown, identifier));
    }

    fn push_restart_sequence(&self, identifier: &str) {
        self.send(OutboundRequest::simple(OutboundRequestKind::RestartSequence, identifier));
    }

    fn push_restart_all(&self, identifier: &str) {
        self.send(OutboundRequest::simple(OutboundRequestKind::RestartAll, identifier));
    }

    fn push_shutdown_all(&self, identifier: &str) {
        self.send(OutboundRequest::simple(OutboundRequestKind::ShutdownAll, identifier));
    }
}

impl ProxyHandle {
    /// Cooperative shutdown (§5): stop accepting the notion of new work by
    /// signalling the worker, then wait up to `grace` for it to drain
    /// in-flight RPCs. Never joins indefinitely — if the grace period
    /// elapses the worker task is abandoned (SPEC_FULL supplemented
    /// feature 5).
    pub async fn shutdown(&mut self, grace: Duration) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if tokio::time::timeout(grace, worker).await.is_err() {
                warn!("proxy worker did not finish within grace period, abandoning");
            }
        }
    }
}

async fn worker_loop(
    transport: Arc<dyn PeerTransport>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundRequest>,
    inbound_tx: mpsc::Sender<PeerEvent>,
    rpc_timeout: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => {
                info!("proxy worker shutting down");
                break;
            }
            request = outbound_rx.recv() => {
                let Some(request) = request else { break };
                drain_batch(&transport, request, &mut outbound_rx, &inbound_tx, rpc_timeout).await;
            }
        }
    }
}

async fn drain_batch(
    transport: &Arc<dyn PeerTransport>,
    first: OutboundRequest,
    outbound_rx: &mut mpsc::UnboundedReceiver<OutboundRequest>,
    inbound_tx: &mpsc::Sender<PeerEvent>,
    rpc_timeout: Duration,
) {
    let mut batch = vec![first];
    while batch.len() < DRAIN_BATCH {
        match outbound_rx.try_recv() {
            Ok(request) => batch.push(request),
            Err(_) => break,
        }
    }
    for request in batch {
        execute(transport, request, inbound_tx, rpc_timeout).await;
    }
}

async fn execute(transport: &Arc<dyn PeerTransport>, request: OutboundRequest, inbound_tx: &mpsc::Sender<PeerEvent>, rpc_timeout: Duration) {
    let identifier = request.identifier.clone();
    if request.kind == OutboundRequestKind::CheckInstance {
        check_instance_and_fetch(transport, &identifier, inbound_tx, rpc_timeout).await;
        return;
    }
    match tokio::time::timeout(rpc_timeout, run(transport, &request)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(identifier = %identifier, kind = ?request.kind, error = %err, "outbound rpc failed"),
        Err(_) => warn!(identifier = %identifier, kind = ?request.kind, timeout_ms = rpc_timeout.as_millis(), "outbound rpc timed out"),
    }
}

/// Handles every outbound kind except `CheckInstance`, which
/// [`execute`] dispatches to [`check_instance_and_fetch`] instead since it
/// has a distinct two-step reply shape.
async fn run(transport: &Arc<dyn PeerTransport>, request: &OutboundRequest) -> Result<(), crate::error::ProxyError> {
    match request.kind {
        OutboundRequestKind::CheckInstance => Ok(()),
        OutboundRequestKind::StartProcess => {
            let namespec = request.namespec.as_deref().unwrap_or_default();
            transport.start_process(&request.identifier, namespec, request.extra_args.as_deref()).await
        }
        OutboundRequestKind::StopProcess => {
            let namespec = request.namespec.as_deref().unwrap_or_default();
            transport.stop_process(&request.identifier, namespec).await
        }
        OutboundRequestKind::Restart => transport.restart(&request.identifier).await,
        OutboundRequestKind::Shutdown => transport.shutdown(&request.identifier).await,
        OutboundRequestKind::RestartSequence => transport.restart_sequence(&request.identifier).await,
        OutboundRequestKind::RestartAll => transport.restart_all(&request.identifier).await,
        OutboundRequestKind::ShutdownAll => transport.shutdown_all(&request.identifier).await,
    }
}

/// §4.8: probes authorization, and on success fetches the remote's full
/// process list, feeding both back as events.
async fn check_instance_and_fetch(transport: &Arc<dyn PeerTransport>, identifier: &str, inbound_tx: &mpsc::Sender<PeerEvent>, rpc_timeout: Duration) {
    let authorized = match tokio::time::timeout(rpc_timeout, transport.check_instance(identifier)).await {
        Ok(Ok(allowed)) => allowed,
        Ok(Err(err)) => {
            warn!(identifier, error = %err, "check_instance failed");
            return;
        }
        Err(_) => {
            warn!(identifier, "check_instance timed out");
            return;
        }
    };
    let _ = inbound_tx.send(PeerEvent::Authorization { peer: identifier.to_string(), allowed: authorized }).await;
    if !authorized {
        return;
    }
    let process_list: Vec<ProcessPayload> = match tokio::time::timeout(rpc_timeout, transport.get_all_process_info(identifier)).await {
        Ok(Ok(list)) => list,
        _ => return,
    };
    let _ = inbound_tx.send(PeerEvent::RemoteInfo { peer: identifier.to_string(), process_list }).await;
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
