// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! supvisors-daemon: the process boundary around `supvisors-engine`.
//!
//! Owns the peer transport, the outbound RPC queue (`Proxy`), the
//! inbound event loop, and the top-level `Supervisors` handle that wires
//! all of it to a `supvisors-core::Context` (§5, §6).

pub mod error;
pub mod event_loop;
pub mod options;
pub mod peer_transport;
pub mod protocol;
pub mod proxy;
pub mod supervisors;
pub mod ws_transport;

pub use error::{FaultCode, ProxyError, RpcFault};
pub use event_loop::{EventLoop, TickOptions};
pub use options::SupervisorsOptions;
pub use peer_transport::PeerTransport;
pub use protocol::{OutboundRequest, OutboundRequestKind, PeerEvent, ProcessPayload};
pub use proxy::{Proxy, ProxyHandle};
pub use supervisors::Supervisors;
pub use ws_transport::WsPeerTransport;
