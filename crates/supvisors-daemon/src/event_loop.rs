// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inbound half of §4.8: applies [`PeerEvent`]s to the shared
//! [`Context`] and drives the FSM tick (§5: exactly one owner of the
//! Context, all writes from the control thread).

use crate::protocol::PeerEvent;
use supvisors_core::{Context, ProcessReport};
use supvisors_engine::{Fsm, RequestSink};
use tracing::debug;

/// Options governing the control-thread tick loop (part of
/// `SupervisorsOptions`, threaded in rather than read from a global).
#[derive(Debug, Clone, Copy)]
pub struct TickOptions {
    pub tick_period_ms: u64,
    pub synchro_timeout_secs: u64,
    pub isolation_ticks: u32,
}

/// Drains the inbound queue and ticks the FSM. Construction is cheap;
/// callers own the `Context`/`Fsm` and hand them in by mutable reference
/// each tick, matching the teacher's stateless-driver convention.
pub struct EventLoop {
    options: TickOptions,
}

impl EventLoop {
    pub fn new(options: TickOptions) -> Self {
        Self { options }
    }

    /// Applies every currently-queued event, then ticks the FSM once.
    /// `now_ms` is injected so tests can drive time deterministically.
    pub fn drain_and_tick(&self, events: Vec<PeerEvent>, ctx: &mut Context, fsm: &mut Fsm, sink: &impl RequestSink, now_ms: u64) {
        for event in events {
            self.apply(event, ctx, sink, now_ms);
        }
        fsm.tick(ctx, sink, now_ms, self.options.synchro_timeout_secs, self.options.isolation_ticks);
    }

    fn apply(&self, event: PeerEvent, ctx: &mut Context, sink: &impl RequestSink, now_ms: u64) {
        match event {
            PeerEvent::Tick { identifier, when, sequence_counter } => {
                // §4.1: `local_time` is this node's own wall clock at receipt,
                // never the peer's self-reported `when` (§4.6: nodes are not
                // assumed clock-synchronized).
                let now_secs = now_ms / 1_000;
                // A tick that lands the node in CHECKING (first contact, or
                // re-contact after SILENT/ISOLATING) kicks off the §4.8
                // authorization probe.
                if ctx.load_node_event(&identifier, when, now_secs, sequence_counter)
                    && ctx.node(&identifier).is_some_and(|n| n.state == supvisors_core::NodeState::Checking)
                {
                    sink.push_check_instance(&identifier);
                }
            }
            PeerEvent::State { identifier, .. } => {
                debug!(identifier, "peer state broadcast received (informational only)");
            }
            PeerEvent::Process { identifier, payload } => {
                ctx.load_process_info(&identifier, vec![ProcessReport { namespec: payload.namespec.clone(), info: payload.into() }]);
            }
            PeerEvent::ProcessAdded { identifier, namespec } => {
                debug!(identifier, namespec, "peer reported a newly configured process");
            }
            PeerEvent::ProcessRemoved { identifier, namespec } => {
                debug!(identifier, namespec, "peer reported a removed process");
            }
            PeerEvent::Authorization { peer, allowed } => {
                if allowed {
                    ctx.authorize_node(&peer);
                } else {
                    ctx.mark_isolated(&peer);
                }
            }
            PeerEvent::RemoteInfo { peer, process_list } => {
                let reports = process_list
                    .into_iter()
                    .map(|payload| ProcessReport { namespec: payload.namespec.clone(), info: payload.into() })
                    .collect();
                ctx.load_process_info(&peer, reports);
            }
        }
    }
}

#[cfg(test)]
#[path = "event_loop_tests.rs"]
mod tests;
