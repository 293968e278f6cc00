// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node liveness record (§3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Liveness state of a node, in the order a node naturally progresses
/// through on a single run (no regression back to CHECKING once RUNNING,
/// except via a fresh tick after SILENT — see [`NodeStatus::on_tick`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Unknown,
    Checking,
    Running,
    Silent,
    Isolating,
    Isolated,
}

crate::simple_display! {
    NodeState {
        Unknown => "unknown",
        Checking => "checking",
        Running => "running",
        Silent => "silent",
        Isolating => "isolating",
        Isolated => "isolated",
    }
}

impl NodeState {
    /// Terminal for the current run: no further transitions are applied
    /// by [`crate::context::Context::on_timer`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Isolated)
    }
}

/// Per-node, per-process info as reported by that node's local agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProcessInfo {
    pub state: crate::process::ProcessState,
    pub uptime: u64,
    pub expected_exit: bool,
    pub pid: Option<u32>,
}

/// Per-node liveness record. Identity is the stable string `identifier`.
/// Never deleted once created (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    pub identifier: String,
    pub state: NodeState,
    /// Seconds, Unix epoch, as reported by the peer in its tick.
    pub remote_time: u64,
    /// Seconds, Unix epoch, of local receipt (for timeout comparisons).
    pub local_time: u64,
    /// Monotonic counter carried on each tick so interleaved/duplicate
    /// ticks from the same peer are idempotent (SPEC_FULL §3).
    pub sequence_counter: u64,
    /// Per-node view of every process it reports.
    pub processes: HashMap<String, RemoteProcessInfo>,
    /// Consecutive ticks observed while already SILENT; drives the
    /// SILENT -> ISOLATING -> ISOLATED progression.
    silent_ticks: u32,
}

impl NodeStatus {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            state: NodeState::Unknown,
            remote_time: 0,
            local_time: 0,
            sequence_counter: 0,
            processes: HashMap::new(),
            silent_ticks: 0,
        }
    }

    /// Sum of `expected_load` over locally-running processes (§3 inv. 3).
    /// Computed from the rules carried alongside each ProcessStatus by
    /// [`crate::context::Context::recompute_load`]; this accessor just
    /// reports the cached value maintained there.
    pub fn load(&self, loads: &HashMap<String, u32>) -> u32 {
        loads.get(&self.identifier).copied().unwrap_or(0)
    }

    /// Apply an incoming tick. Returns `true` if the tick was newer than
    /// the last seen (and thus applied); `false` if it was dropped as a
    /// stale/duplicate delivery.
    pub fn on_tick(&mut self, remote_time: u64, local_time: u64, sequence_counter: u64) -> bool {
        if self.state != NodeState::Unknown && sequence_counter <= self.sequence_counter {
            return false;
        }
        self.remote_time = remote_time;
        self.local_time = local_time;
        self.sequence_counter = sequence_counter;
        self.silent_ticks = 0;
        if self.state == NodeState::Unknown {
            self.state = NodeState::Checking;
        } else if self.state == NodeState::Silent || self.state == NodeState::Isolating {
            // A fresh tick from a node we'd marked unreachable re-enters
            // the authorization dance rather than snapping straight back
            // to RUNNING.
            self.state = NodeState::Checking;
        }
        true
    }

    /// Authorization probe succeeded: CHECKING -> RUNNING.
    pub fn authorize(&mut self) {
        if self.state == NodeState::Checking {
            self.state = NodeState::Running;
        }
    }

    /// §4.1 `on_timer`: silence/isolation progression. `now` and
    /// `synchro_timeout`/`isolation_ticks` are in seconds / tick counts.
    pub fn on_timer(&mut self, now: u64, synchro_timeout: u64, isolation_ticks: u32) {
        match self.state {
            NodeState::Running | NodeState::Checking => {
                if now.saturating_sub(self.local_time) > synchro_timeout {
                    self.state = NodeState::Silent;
                    self.silent_ticks = 0;
                }
            }
            NodeState::Silent => {
                self.silent_ticks += 1;
                if self.silent_ticks >= isolation_ticks {
                    self.state = NodeState::Isolating;
                }
            }
            NodeState::Isolating => {
                self.state = NodeState::Isolated;
            }
            NodeState::Unknown | NodeState::Isolated => {}
        }
    }

    /// Mark the node isolated immediately (failed authorization, S5).
    pub fn mark_isolated(&mut self) {
        self.state = NodeState::Isolated;
    }

    pub fn is_running(&self) -> bool {
        self.state == NodeState::Running
    }
}

crate::builder! {
    pub struct NodeStatusBuilder => NodeStatus {
        into {
            identifier: String = "10.0.0.1",
        }
        set {
            state: NodeState = NodeState::Running,
            remote_time: u64 = 0,
            local_time: u64 = 0,
            sequence_counter: u64 = 0,
            processes: HashMap<String, RemoteProcessInfo> = HashMap::new(),
        }
        computed {
            silent_ticks: u32 = 0,
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
