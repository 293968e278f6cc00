// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires Context + FSM + EventLoop + Proxy behind one handle (§2 "Data
//! flow"), the daemon-level counterpart of the teacher's `DaemonState`.

use crate::event_loop::{EventLoop, TickOptions};
use crate::options::SupervisorsOptions;
use crate::peer_transport::PeerTransport;
use crate::protocol::PeerEvent;
use crate::proxy::{Proxy, ProxyHandle};
use std::sync::Arc;
use std::time::Duration;
use supvisors_core::{AddressMapper, ApplicationRules, ApplicationStatus, Context, NodeStatus, ProcessRules, ProcessStatus, StartingStrategy};
use supvisors_engine::{EngineError, Fsm, FsmState};
use tokio::sync::mpsc;

/// §6 `get_api_version`.
pub const API_VERSION: &str = "1.0";

/// The single owner of the cluster-wide [`Context`] (§5). All writes
/// originate here, on whatever thread calls [`Supervisors::tick`].
pub struct Supervisors {
    ctx: Context,
    fsm: Fsm,
    event_loop: EventLoop,
    proxy: Proxy,
    proxy_handle: ProxyHandle,
    options: SupervisorsOptions,
}

impl Supervisors {
    pub fn new(options: SupervisorsOptions, transport: Arc<dyn PeerTransport>, inbound_tx: mpsc::Sender<PeerEvent>) -> Self {
        let mapper = Arc::new(AddressMapper::new(options.node_identifiers.clone(), options.local_identifier.clone()));
        let ctx = Context::new(mapper);
        let fsm = Fsm::new(options.default_conciliation_strategy, options.process_deadline.as_millis() as u64);
        let event_loop = EventLoop::new(TickOptions {
            tick_period_ms: options.tick_period.as_millis() as u64,
            synchro_timeout_secs: options.synchro_timeout_secs,
            isolation_ticks: options.isolation_ticks,
        });
        let (proxy, proxy_handle) = Proxy::spawn(transport, inbound_tx, options.rpc_timeout);
        Self { ctx, fsm, event_loop, proxy, proxy_handle, options }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn master_identifier(&self) -> Option<&str> {
        self.fsm.master_identifier()
    }

    // -- Status surface (§6), read-only projections over the owned Context --

    pub fn api_version(&self) -> &'static str {
        API_VERSION
    }

    pub fn supvisors_state(&self) -> FsmState {
        self.fsm.state()
    }

    pub fn all_instances_info(&self) -> Vec<&NodeStatus> {
        self.ctx.mapper().node_identifiers().iter().filter_map(|id| self.ctx.node(id)).collect()
    }

    pub fn instance_info(&self, identifier: &str) -> Option<&NodeStatus> {
        self.ctx.node(identifier)
    }

    pub fn all_applications_info(&self) -> Vec<&ApplicationStatus> {
        self.ctx.applications().collect()
    }

    pub fn application_info(&self, name: &str) -> Option<&ApplicationStatus> {
        self.ctx.application(name)
    }

    pub fn process_info(&self, namespec: &str) -> Option<&ProcessStatus> {
        self.ctx.process(namespec)
    }

    pub fn process_rules(&self, namespec: &str) -> Option<&ProcessRules> {
        self.ctx.process(namespec).map(|p| &p.rules)
    }

    pub fn conflicts(&self) -> Vec<&ProcessStatus> {
        self.ctx.conflicts()
    }

    /// Register a process ahead of time (configuration parsing is out of
    /// scope, §1 — the caller supplies a populated rules structure).
    pub fn register_process(&mut self, namespec: impl Into<String>, app_rules: ApplicationRules, process_rules: ProcessRules) {
        self.ctx.register_process(namespec, app_rules, process_rules);
    }

    /// Applies every queued inbound event and ticks the FSM once.
    pub fn tick(&mut self, events: Vec<PeerEvent>, now_ms: u64) {
        self.event_loop.drain_and_tick(events, &mut self.ctx, &mut self.fsm, &self.proxy, now_ms);
    }

    // -- RPC surface (§6), delegated straight to the FSM against the
    // owned Context --

    pub fn start_application(&mut self, strategy: StartingStrategy, name: &str) -> Result<bool, EngineError> {
        self.fsm.start_application(strategy, name, &self.ctx)
    }

    pub fn stop_application(&mut self, name: &str) -> Result<bool, EngineError> {
        self.fsm.stop_application(name, &self.ctx)
    }

    pub fn start_process(&mut self, strategy: StartingStrategy, namespec: &str, extra_args: Option<&str>) -> Result<bool, EngineError> {
        self.fsm.start_process(strategy, namespec, extra_args, &self.ctx)
    }

    pub fn stop_process(&mut self, namespec: &str) -> Result<bool, EngineError> {
        self.fsm.stop_process(namespec, &self.ctx)
    }

    pub fn restart_application(&mut self, strategy: StartingStrategy, name: &str) -> Result<bool, EngineError> {
        self.fsm.restart_application(strategy, name, &self.ctx)
    }

    pub fn restart_process(&mut self, strategy: StartingStrategy, namespec: &str, extra_args: Option<&str>) -> Result<bool, EngineError> {
        self.fsm.restart_process(strategy, namespec, extra_args, &self.ctx)
    }

    pub fn start_args(&mut self, namespec: &str, extra_args: Option<&str>) -> Result<bool, EngineError> {
        self.fsm.start_args(namespec, extra_args, &self.ctx)
    }

    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.fsm.restart()
    }

    pub fn shutdown_cluster(&mut self) -> Result<(), EngineError> {
        self.fsm.shutdown()
    }

    pub fn default_starting_strategy(&self) -> StartingStrategy {
        self.options.default_starting_strategy
    }

    /// Cooperative process shutdown (§5, SPEC_FULL supplemented feature
    /// 5): stop the Proxy worker, never blocking past `grace`.
    pub async fn shutdown(mut self, grace: Duration) {
        self.proxy_handle.shutdown(grace).await;
    }
}

#[cfg(test)]
#[path = "supervisors_tests.rs"]
mod tests;
