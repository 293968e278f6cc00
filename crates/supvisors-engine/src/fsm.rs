// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-wide finite state machine (§4.7).

use crate::conciliation;
use crate::error::EngineError;
use crate::failure_handler::FailureHandler;
use crate::request_sink::RequestSink;
use crate::starter::Starter;
use crate::stopper::Stopper;
use std::collections::HashMap;
use supvisors_core::{ApplicationState, ConciliationStrategy, Context, StartingStrategy};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsmState {
    Initialization,
    Deployment,
    Operation,
    Conciliation,
    Restarting,
    ShuttingDown,
    Shutdown,
}

supvisors_core::simple_display! {
    FsmState {
        Initialization => "initialization",
        Deployment => "deployment",
        Operation => "operation",
        Conciliation => "conciliation",
        Restarting => "restarting",
        ShuttingDown => "shutting_down",
        Shutdown => "shutdown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TerminateKind {
    Restart,
    Shutdown,
}

/// Owns the Starter/Stopper/FailureHandler job engines and the cluster
/// state (§4.7), driven by the caller's tick loop against a shared
/// [`Context`].
pub struct Fsm {
    state: FsmState,
    master: Option<String>,
    starter: Starter,
    stopper: Stopper,
    failure_handler: FailureHandler,
    conciliation_strategy: ConciliationStrategy,
    init_deadline_ms: Option<u64>,
    pending_terminate: Option<TerminateKind>,
    /// Applications/processes that `restart_application`/`restart_process`
    /// stopped and are waiting to be handed back to the Starter once
    /// STOPPED is observed, with the caller's strategy/extra_args
    /// preserved across the stop (§6; distinct from the FailureHandler's
    /// own reactive restart jobs in §4.5, which always use the process's
    /// configured strategy).
    pending_restart_applications: HashMap<String, StartingStrategy>,
    pending_restart_processes: HashMap<String, (StartingStrategy, Option<String>)>,
}

impl Fsm {
    pub fn new(conciliation_strategy: ConciliationStrategy, process_deadline_ms: u64) -> Self {
        Self {
            state: FsmState::Initialization,
            master: None,
            starter: Starter::new(process_deadline_ms),
            stopper: Stopper::new(process_deadline_ms),
            failure_handler: FailureHandler::new(),
            conciliation_strategy,
            init_deadline_ms: None,
            pending_terminate: None,
            pending_restart_applications: HashMap::new(),
            pending_restart_processes: HashMap::new(),
        }
    }

    pub fn state(&self) -> FsmState {
        self.state
    }

    pub fn master_identifier(&self) -> Option<&str> {
        self.master.as_deref()
    }

    pub fn starter(&self) -> &Starter {
        &self.starter
    }

    pub fn stopper(&self) -> &Stopper {
        &self.stopper
    }

    fn transition(&mut self, to: FsmState) {
        info!(from = %self.state, to = %to, "fsm transition");
        self.state = to;
    }

    /// One FSM tick: drains timers, advances job engines, and applies the
    /// state-transition table (§4.7).
    pub fn tick(&mut self, ctx: &mut Context, sink: &impl RequestSink, now_ms: u64, synchro_timeout_secs: u64, isolation_ticks: u32) {
        let now_secs = now_ms / 1_000;
        ctx.on_timer(now_secs, synchro_timeout_secs, isolation_ticks);

        if self.master_lost(ctx) {
            self.reset_to_initialization();
            return;
        }

        match self.state {
            FsmState::Initialization => self.tick_initialization(ctx, now_ms, synchro_timeout_secs),
            FsmState::Deployment => self.tick_deployment(ctx, sink, now_ms),
            FsmState::Operation => self.tick_operation(ctx, sink, now_ms),
            FsmState::Conciliation => self.tick_conciliation(ctx, sink, now_ms),
            FsmState::Restarting | FsmState::ShuttingDown => {
                // Entry side effect already issued the peer RPCs; one more
                // tick is enough for the outbound queue to drain before we
                // consider the run over.
                self.transition(FsmState::Shutdown);
            }
            FsmState::Shutdown => {}
        }
    }

    /// §4.7 "any RUNNING* -(master lost)-> INITIALIZATION". Never fires
    /// from INITIALIZATION itself (no master elected yet) or once the run
    /// has already started terminating.
    fn master_lost(&self, ctx: &Context) -> bool {
        if matches!(self.state, FsmState::Initialization | FsmState::Restarting | FsmState::ShuttingDown | FsmState::Shutdown) {
            return false;
        }
        match &self.master {
            Some(id) => !ctx.is_node_running(id),
            None => false,
        }
    }

    fn reset_to_initialization(&mut self) {
        info!(master = ?self.master, "master lost, resetting to initialization");
        self.master = None;
        self.init_deadline_ms = None;
        self.transition(FsmState::Initialization);
    }

    fn tick_initialization(&mut self, ctx: &Context, now_ms: u64, synchro_timeout_secs: u64) {
        let deadline = *self.init_deadline_ms.get_or_insert(now_ms + synchro_timeout_secs * 1_000);
        let all_running = ctx.mapper().node_identifiers().iter().all(|id| ctx.is_node_running(id));
        if all_running || now_ms >= deadline {
            self.enter_deployment(ctx);
        }
    }

    /// §3 invariant 4: lexicographically smallest RUNNING identifier,
    /// pinned while it stays RUNNING.
    fn enter_deployment(&mut self, ctx: &Context) {
        let mut running: Vec<&str> = ctx.mapper().node_identifiers().iter().map(String::as_str).filter(|id| ctx.is_node_running(id)).collect();
        running.sort_unstable();
        self.master = running.first().map(|s| s.to_string());
        info!(master = ?self.master, "master elected entering deployment");

        for application in ctx.applications() {
            if application.is_managed() {
                self.starter.start_application(StartingStrategy::Config, application, ctx);
            }
        }
        self.transition(FsmState::Deployment);
    }

    fn tick_deployment(&mut self, ctx: &Context, sink: &impl RequestSink, now_ms: u64) {
        self.starter.tick(ctx, sink, now_ms);
        if !self.starter.in_progress() {
            self.transition(FsmState::Operation);
        }
    }

    fn tick_operation(&mut self, ctx: &Context, sink: &impl RequestSink, now_ms: u64) {
        if !ctx.conflicts().is_empty() {
            conciliation::conciliate(self.conciliation_strategy, ctx, sink, &mut self.failure_handler);
            self.transition(FsmState::Conciliation);
            return;
        }
        self.starter.tick(ctx, sink, now_ms);
        self.stopper.tick(ctx, sink, now_ms);

        let active: std::collections::HashSet<String> =
            self.starter.active_applications().into_iter().chain(self.stopper.active_applications()).collect();
        let starter = &mut self.starter;
        let stopper = &mut self.stopper;
        self.failure_handler.trigger_jobs(ctx, starter, stopper, |name| active.contains(name));
        self.drive_pending_restarts(ctx, &active);

        if let Some(kind) = self.pending_terminate.take() {
            self.enter_terminate(ctx, sink, kind);
        }
    }

    /// Hands a `restart_application`/`restart_process` stop back to the
    /// Starter once the application/process has actually reached STOPPED,
    /// using the strategy/extra_args the original RPC caller supplied.
    fn drive_pending_restarts(&mut self, ctx: &Context, active: &std::collections::HashSet<String>) {
        let ready_applications: Vec<String> = self
            .pending_restart_applications
            .keys()
            .filter(|name| !active.contains(*name) && ctx.application_state(name) == ApplicationState::Stopped)
            .cloned()
            .collect();
        for application_name in ready_applications {
            let strategy = self.pending_restart_applications.remove(&application_name).expect("just looked up");
            if let Some(application) = ctx.application(&application_name) {
                self.starter.start_application(strategy, application, ctx);
            }
        }

        let ready_processes: Vec<String> = self
            .pending_restart_processes
            .keys()
            .filter(|ns| !active.contains(owning_application(ns)) && !ctx.is_process_running(ns))
            .filter(|ns| ctx.process(ns).is_some_and(|p| p.state().is_stopped_family()))
            .cloned()
            .collect();
        for namespec in ready_processes {
            let (strategy, extra_args) = self.pending_restart_processes.remove(&namespec).expect("just looked up");
            if let Some(process) = ctx.process(&namespec) {
                self.starter.start_process(strategy, process, extra_args.as_deref(), ctx);
            }
        }
    }

    fn tick_conciliation(&mut self, ctx: &Context, _sink: &impl RequestSink, _now_ms: u64) {
        if ctx.conflicts().is_empty() {
            self.transition(FsmState::Operation);
        }
    }

    fn enter_terminate(&mut self, ctx: &Context, sink: &impl RequestSink, kind: TerminateKind) {
        let local = ctx.mapper().local_identifier();
        let mut remotes: Vec<&str> = ctx.mapper().node_identifiers().iter().map(String::as_str).filter(|id| *id != local).collect();
        remotes.sort_unstable();
        for identifier in remotes {
            match kind {
                TerminateKind::Restart => sink.push_restart(identifier),
                TerminateKind::Shutdown => sink.push_shutdown(identifier),
            }
        }
        match kind {
            TerminateKind::Restart => sink.push_restart(local),
            TerminateKind::Shutdown => sink.push_shutdown(local),
        }
        self.transition(match kind {
            TerminateKind::Restart => FsmState::Restarting,
            TerminateKind::Shutdown => FsmState::ShuttingDown,
        });
    }

    // -- RPC surface (§6), restricted to a permitted state set per call --

    pub fn start_application(&mut self, strategy: StartingStrategy, application_name: &str, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation])?;
        let application = ctx.application(application_name).ok_or_else(|| EngineError::BadName(application_name.to_string()))?;
        if ctx.application_state(application_name) != ApplicationState::Stopped {
            return Err(EngineError::AlreadyStarted(application_name.to_string()));
        }
        Ok(self.starter.start_application(strategy, application, ctx))
    }

    pub fn stop_application(&mut self, application_name: &str, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation, FsmState::Conciliation])?;
        let application = ctx.application(application_name).ok_or_else(|| EngineError::BadName(application_name.to_string()))?;
        Ok(self.stopper.stop_application(application, ctx))
    }

    pub fn start_process(&mut self, strategy: StartingStrategy, namespec: &str, extra_args: Option<&str>, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation])?;
        let process = ctx.process(namespec).ok_or_else(|| EngineError::BadName(namespec.to_string()))?;
        if extra_args.is_some() && !process.rules.extra_args_allowed {
            return Err(EngineError::BadExtraArguments(namespec.to_string()));
        }
        if ctx.is_process_running(namespec) {
            return Err(EngineError::AlreadyStarted(namespec.to_string()));
        }
        Ok(self.starter.start_process(strategy, process, extra_args, ctx))
    }

    pub fn stop_process(&mut self, namespec: &str, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation, FsmState::Conciliation])?;
        let process = ctx.process(namespec).ok_or_else(|| EngineError::BadName(namespec.to_string()))?;
        if !ctx.is_process_running(namespec) {
            return Err(EngineError::NotRunning(namespec.to_string()));
        }
        Ok(self.stopper.stop_process(process, ctx))
    }

    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.require_state(&[FsmState::Operation])?;
        self.pending_terminate = Some(TerminateKind::Restart);
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.require_state(&[FsmState::Operation])?;
        self.pending_terminate = Some(TerminateKind::Shutdown);
        Ok(())
    }

    /// §6 `restart_application(strategy, name, wait)`. Stops the
    /// application now; the Starter picks it back up under `strategy` once
    /// it reaches STOPPED (`drive_pending_restarts`).
    pub fn restart_application(&mut self, strategy: StartingStrategy, application_name: &str, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation])?;
        let application = ctx.application(application_name).ok_or_else(|| EngineError::BadName(application_name.to_string()))?;
        self.pending_restart_applications.insert(application_name.to_string(), strategy);
        Ok(self.stopper.stop_application(application, ctx))
    }

    /// §6 `restart_process(strategy, namespec, extra_args, wait)`. Same
    /// shape as `restart_application` but for a single process.
    pub fn restart_process(&mut self, strategy: StartingStrategy, namespec: &str, extra_args: Option<&str>, ctx: &Context) -> Result<bool, EngineError> {
        self.require_state(&[FsmState::Operation])?;
        let process = ctx.process(namespec).ok_or_else(|| EngineError::BadName(namespec.to_string()))?;
        if extra_args.is_some() && !process.rules.extra_args_allowed {
            return Err(EngineError::BadExtraArguments(namespec.to_string()));
        }
        self.pending_restart_processes.insert(namespec.to_string(), (strategy, extra_args.map(str::to_string)));
        Ok(self.stopper.stop_process(process, ctx))
    }

    /// §6 `start_args(namespec, extra_args, wait)`: the Starter's own
    /// internal start call (used for deployment and for `restart_process`'s
    /// restart leg), exposed to RPC callers with the process's configured
    /// strategy rather than a caller-chosen one — it differs from
    /// `start_process` only in that the strategy isn't a parameter.
    pub fn start_args(&mut self, namespec: &str, extra_args: Option<&str>, ctx: &Context) -> Result<bool, EngineError> {
        self.start_process(StartingStrategy::Config, namespec, extra_args, ctx)
    }

    fn require_state(&self, allowed: &[FsmState]) -> Result<(), EngineError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(EngineError::BadSupvisorsState(self.state.to_string()))
        }
    }
}

fn owning_application(namespec: &str) -> &str {
    namespec.split(':').next().unwrap_or(namespec)
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
