// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level shapes for the peer event channel and the outbound RPC queue
//! (§6 "Peer event channel (abstract)", §4.8).

use serde::{Deserialize, Serialize};
use supvisors_core::{ProcessState, RemoteProcessInfo};

/// A single process instance report carried by a `PROCESS`/`REMOTE_INFO`
/// event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayload {
    pub namespec: String,
    pub state: ProcessState,
    pub uptime: u64,
    pub expected_exit: bool,
    pub pid: Option<u32>,
}

impl From<ProcessPayload> for RemoteProcessInfo {
    fn from(payload: ProcessPayload) -> Self {
        RemoteProcessInfo {
            state: payload.state,
            uptime: payload.uptime,
            expected_exit: payload.expected_exit,
            pid: payload.pid,
        }
    }
}

/// Inbound side of the duplex peer event channel (§6). One value per
/// message delivered by the transport; the EventLoop drains these and
/// applies them to the shared [`supvisors_core::Context`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PeerEvent {
    /// Periodic liveness tick from `identifier`.
    Tick { identifier: String, when: u64, sequence_counter: u64 },
    /// The peer's own FSM state, broadcast for observability (not consumed
    /// by the local FSM, which derives its own state independently).
    State { identifier: String, fsm_state: String, master: Option<String>, flags: Vec<String> },
    /// A single process's state changed on the reporting peer.
    Process { identifier: String, payload: ProcessPayload },
    /// A process was added to the reporting peer's rules (not modelled
    /// further: core treats configuration as static, §1).
    ProcessAdded { identifier: String, namespec: String },
    /// A process was removed from the reporting peer's rules.
    ProcessRemoved { identifier: String, namespec: String },
    /// Response to a `CHECK_INSTANCE` probe: whether the peer still
    /// considers the local node authorized.
    Authorization { peer: String, allowed: bool },
    /// Full process list snapshot from a peer, fetched after a successful
    /// `CHECK_INSTANCE` (§4.8).
    RemoteInfo { peer: String, process_list: Vec<ProcessPayload> },
}

/// Outbound RPC kinds the Proxy issues against remote peers (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundRequestKind {
    CheckInstance,
    StartProcess,
    StopProcess,
    Restart,
    Shutdown,
    RestartSequence,
    RestartAll,
    ShutdownAll,
}

/// One deferred outbound RPC, queued by `supvisors-engine`'s job engines
/// through [`supvisors_engine::RequestSink`] and drained by the Proxy's
/// background worker.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub kind: OutboundRequestKind,
    pub identifier: String,
    pub namespec: Option<String>,
    pub extra_args: Option<String>,
}

impl OutboundRequest {
    pub fn check_instance(identifier: impl Into<String>) -> Self {
        Self { kind: OutboundRequestKind::CheckInstance, identifier: identifier.into(), namespec: None, extra_args: None }
    }

    pub fn start_process(identifier: impl Into<String>, namespec: impl Into<String>, extra_args: Option<&str>) -> Self {
        Self {
            kind: OutboundRequestKind::StartProcess,
            identifier: identifier.into(),
            namespec: Some(namespec.into()),
            extra_args: extra_args.map(str::to_string),
        }
    }

    pub fn stop_process(identifier: impl Into<String>, namespec: impl Into<String>) -> Self {
        Self { kind: OutboundRequestKind::StopProcess, identifier: identifier.into(), namespec: Some(namespec.into()), extra_args: None }
    }

    pub fn simple(kind: OutboundRequestKind, identifier: impl Into<String>) -> Self {
        Self { kind, identifier: identifier.into(), namespec: None, extra_args: None }
    }
}
