// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process aggregated state across all nodes reporting it (§3).

use crate::node::RemoteProcessInfo;
use crate::rules::ProcessRules;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The state a single node reports for a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Stopped,
    Starting,
    Backoff,
    Running,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

crate::simple_display! {
    ProcessState {
        Stopped => "stopped",
        Starting => "starting",
        Backoff => "backoff",
        Running => "running",
        Stopping => "stopping",
        Exited => "exited",
        Fatal => "fatal",
        Unknown => "unknown",
    }
}

impl ProcessState {
    /// Aggregation priority, highest first. A process reported in more
    /// than one of these states across nodes is summarized as the
    /// highest-priority one.
    const PRIORITY: [ProcessState; 8] = [
        ProcessState::Running,
        ProcessState::Starting,
        ProcessState::Backoff,
        ProcessState::Stopping,
        ProcessState::Exited,
        ProcessState::Fatal,
        ProcessState::Stopped,
        ProcessState::Unknown,
    ];

    fn rank(&self) -> usize {
        Self::PRIORITY.iter().position(|s| s == self).unwrap_or(Self::PRIORITY.len())
    }

    /// True once the Starter considers the process no longer "starting"
    /// (§9 open question 3: a subsequent EXITED-expected still counts as
    /// a successful start since it left STARTING/BACKOFF on its own).
    pub fn is_starting(&self) -> bool {
        matches!(self, ProcessState::Starting | ProcessState::Backoff)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    pub fn is_stopped_family(&self) -> bool {
        matches!(self, ProcessState::Stopped | ProcessState::Exited | ProcessState::Fatal)
    }

    /// True for the terminal failure states a Starter/Stopper job deadline
    /// doesn't need to wait out (§4.3 step 1: "FATAL/EXITED ... failure").
    pub fn is_fatal_family(&self) -> bool {
        matches!(self, ProcessState::Fatal | ProcessState::Exited)
    }
}

/// Derive the aggregate state from the set of per-node states reporting
/// this process, per the priority order documented on [`ProcessState`].
/// An empty set (no node reports the process) aggregates to STOPPED.
pub fn aggregate_state<'a>(states: impl Iterator<Item = &'a ProcessState>) -> ProcessState {
    states.min_by_key(|s| s.rank()).copied().unwrap_or(ProcessState::Stopped)
}

/// Identity: namespec `"group:name"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStatus {
    pub namespec: String,
    /// Per-node info as last reported by that node's agent.
    pub info: HashMap<String, RemoteProcessInfo>,
    pub rules: ProcessRules,
}

impl ProcessStatus {
    pub fn new(namespec: impl Into<String>, rules: ProcessRules) -> Self {
        Self { namespec: namespec.into(), info: HashMap::new(), rules }
    }

    /// Replace this process's slice of info for one node and recompute
    /// nothing else — aggregate state is always derived on read, never
    /// cached, so there is nothing else to recompute (§3 invariant:
    /// "aggregate state is derived, never assigned directly").
    pub fn set_node_info(&mut self, identifier: impl Into<String>, info: RemoteProcessInfo) {
        self.info.insert(identifier.into(), info);
    }

    /// Drop a node's slice (node loss / isolation, §4.1 `invalidate`).
    pub fn remove_node(&mut self, identifier: &str) {
        self.info.remove(identifier);
    }

    /// Derived aggregate state (§3, §8 invariant 1 upstream in
    /// ApplicationStatus).
    pub fn state(&self) -> ProcessState {
        aggregate_state(self.info.values().map(|i| &i.state))
    }

    /// Identifiers currently reporting RUNNING for this process.
    pub fn running_identifiers(&self) -> Vec<&str> {
        self.info
            .iter()
            .filter(|(_, i)| i.state.is_running())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// §3 invariant: `|running_identifiers| > 1` ⇒ conflicting.
    pub fn is_conflicting(&self) -> bool {
        self.running_identifiers().len() > 1
    }

    /// Whether `identifier` is an allowed placement per the rules.
    pub fn allows_node(&self, identifier: &str) -> bool {
        self.rules.nodes.iter().any(|n| n == identifier)
    }
}

crate::builder! {
    pub struct ProcessStatusBuilder => ProcessStatus {
        into {
            namespec: String = "app:proc",
        }
        set {
            info: HashMap<String, RemoteProcessInfo> = HashMap::new(),
            rules: ProcessRules = ProcessRules::default(),
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
