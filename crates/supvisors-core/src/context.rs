// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single mutable registry owning all NodeStatus / ApplicationStatus /
//! ProcessStatus instances (§4.1, §9 design note on the
//! Context/Application/Process cycle).

use crate::address_mapper::AddressMapper;
use crate::application::{self, ApplicationState, ApplicationStatus};
use crate::node::{NodeStatus, RemoteProcessInfo};
use crate::process::{ProcessState, ProcessStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single process instance report delivered alongside a peer's
/// `REMOTE_INFO`/`PROCESS` event (§6).
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub namespec: String,
    pub info: RemoteProcessInfo,
}

/// Owns all NodeStatus/ApplicationStatus/ProcessStatus. All writes
/// originate from the control thread (§5).
pub struct Context {
    mapper: Arc<AddressMapper>,
    nodes: HashMap<String, NodeStatus>,
    processes: HashMap<String, ProcessStatus>,
    applications: HashMap<String, ApplicationStatus>,
    loads: HashMap<String, u32>,
}

impl Context {
    pub fn new(mapper: Arc<AddressMapper>) -> Self {
        let mut nodes = HashMap::new();
        for id in mapper.node_identifiers() {
            nodes.insert(id.clone(), NodeStatus::new(id.clone()));
        }
        Self { mapper, nodes, processes: HashMap::new(), applications: HashMap::new(), loads: HashMap::new() }
    }

    pub fn mapper(&self) -> &AddressMapper {
        &self.mapper
    }

    /// Register a process and attach it to its owning application,
    /// consuming a populated rules structure (configuration parsing is
    /// out of scope, §1).
    pub fn register_process(&mut self, namespec: impl Into<String>, app_rules: crate::rules::ApplicationRules, process_rules: crate::rules::ProcessRules) {
        let namespec = namespec.into();
        let app_name = namespec.split(':').next().unwrap_or(&namespec).to_string();
        self.applications
            .entry(app_name.clone())
            .or_insert_with(|| ApplicationStatus::new(app_name.clone(), app_rules));
        if let Some(app) = self.applications.get_mut(&app_name) {
            app.add_process(namespec.clone(), &process_rules);
        }
        self.processes.entry(namespec.clone()).or_insert_with(|| ProcessStatus::new(namespec, process_rules));
    }

    pub fn node(&self, identifier: &str) -> Option<&NodeStatus> {
        self.nodes.get(identifier)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeStatus> {
        self.nodes.values()
    }

    pub fn process(&self, namespec: &str) -> Option<&ProcessStatus> {
        self.processes.get(namespec)
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessStatus> {
        self.processes.values()
    }

    pub fn application(&self, name: &str) -> Option<&ApplicationStatus> {
        self.applications.get(name)
    }

    pub fn applications(&self) -> impl Iterator<Item = &ApplicationStatus> {
        self.applications.values()
    }

    /// §4.1 `load_node_event`: updates `remote_time`/`local_time`,
    /// transitioning UNKNOWN -> CHECKING. Returns `true` if the tick was
    /// newer than the last seen for this peer.
    pub fn load_node_event(&mut self, identifier: &str, remote_time: u64, local_time: u64, sequence_counter: u64) -> bool {
        let Some(node) = self.nodes.get_mut(identifier) else {
            warn!(identifier, "tick from unconfigured node ignored");
            return false;
        };
        let applied = node.on_tick(remote_time, local_time, sequence_counter);
        if applied {
            debug!(identifier, remote_time, "tick applied");
        }
        applied
    }

    /// The authorization probe (`CHECK_INSTANCE`, §4.8) succeeded:
    /// CHECKING -> RUNNING.
    pub fn authorize_node(&mut self, identifier: &str) {
        if let Some(node) = self.nodes.get_mut(identifier) {
            node.authorize();
            if node.is_running() {
                info!(identifier, "node authorized and running");
            }
        }
    }

    /// S5: the remote reported the local node as ISOLATING/ISOLATED —
    /// mark that remote ISOLATED locally, never re-enter the dance.
    pub fn mark_isolated(&mut self, identifier: &str) {
        if let Some(node) = self.nodes.get_mut(identifier) {
            node.mark_isolated();
            warn!(identifier, "node marked isolated");
        }
        self.invalidate(identifier);
    }

    /// §4.1 `load_process_info`: replaces the reporting node's slice of
    /// every affected ProcessStatus.
    pub fn load_process_info(&mut self, identifier: &str, reports: Vec<ProcessReport>) {
        for report in reports {
            if let Some(process) = self.processes.get_mut(&report.namespec) {
                process.set_node_info(identifier, report.info);
            } else {
                warn!(namespec = %report.namespec, "process info for unregistered process ignored");
            }
        }
        self.recompute_load();
    }

    /// §4.1 `on_timer`.
    pub fn on_timer(&mut self, now: u64, synchro_timeout: u64, isolation_ticks: u32) {
        let mut newly_isolated = Vec::new();
        for node in self.nodes.values_mut() {
            let was_running = node.is_running();
            node.on_timer(now, synchro_timeout, isolation_ticks);
            if was_running && !node.is_running() {
                newly_isolated.push(node.identifier.clone());
            }
        }
        for identifier in newly_isolated {
            self.invalidate(&identifier);
        }
    }

    /// §4.1 `invalidate`: on node loss, drop that slice from every
    /// ProcessStatus and recompute.
    pub fn invalidate(&mut self, identifier: &str) {
        for process in self.processes.values_mut() {
            process.remove_node(identifier);
        }
        self.recompute_load();
    }

    /// §4.1 `conflicts`.
    pub fn conflicts(&self) -> Vec<&ProcessStatus> {
        self.processes.values().filter(|p| p.is_conflicting()).collect()
    }

    /// §3 invariant 3: recompute every node's load from the processes
    /// currently reported RUNNING/STARTING/BACKOFF on it.
    fn recompute_load(&mut self) {
        let mut loads: HashMap<String, u32> = HashMap::new();
        for process in self.processes.values() {
            for (identifier, info) in &process.info {
                if matches!(info.state, ProcessState::Running | ProcessState::Starting | ProcessState::Backoff) {
                    *loads.entry(identifier.clone()).or_insert(0) += process.rules.expected_load;
                }
            }
        }
        self.loads = loads;
    }

    pub fn load(&self, identifier: &str) -> u32 {
        self.loads.get(identifier).copied().unwrap_or(0)
    }

    pub fn loads(&self) -> &HashMap<String, u32> {
        &self.loads
    }

    /// Whether the named process's aggregate state is RUNNING.
    pub fn is_process_running(&self, namespec: &str) -> bool {
        self.processes.get(namespec).is_some_and(|p| p.state().is_running())
    }

    /// Whether `identifier` is currently RUNNING, for use as the
    /// `running` predicate passed to [`crate::placement::choose_node`].
    pub fn is_node_running(&self, identifier: &str) -> bool {
        self.nodes.get(identifier).is_some_and(|n| n.is_running())
    }

    /// Derived application state (§3 invariant 1), resolving member
    /// processes through this Context.
    pub fn application_state(&self, name: &str) -> ApplicationState {
        let Some(app) = self.applications.get(name) else {
            return ApplicationState::Stopped;
        };
        let states: Vec<ProcessState> = app
            .process_namespecs
            .iter()
            .filter_map(|ns| self.processes.get(ns))
            .map(|p| p.state())
            .collect();
        application::derive_state(states.iter())
    }

    /// §3 invariant 2.
    pub fn application_failures(&self, name: &str) -> (bool, bool) {
        let Some(app) = self.applications.get(name) else {
            return (false, false);
        };
        let state = self.application_state(name);
        let pairs: Vec<(ProcessState, crate::rules::ProcessRules)> = app
            .process_namespecs
            .iter()
            .filter_map(|ns| self.processes.get(ns))
            .map(|p| (p.state(), p.rules.clone()))
            .collect();
        application::derive_failures(state, pairs.iter().map(|(s, r)| (s, r)))
    }

    /// Every identifier currently reporting RUNNING for any process in
    /// the application, grouped by process (SPEC_FULL supplemented
    /// feature 4: `ApplicationStatus::distribution()`).
    pub fn application_distribution(&self, name: &str) -> HashMap<String, Vec<String>> {
        let mut out = HashMap::new();
        let Some(app) = self.applications.get(name) else {
            return out;
        };
        for ns in &app.process_namespecs {
            if let Some(p) = self.processes.get(ns) {
                out.insert(ns.clone(), p.running_identifiers().into_iter().map(str::to_string).collect());
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
