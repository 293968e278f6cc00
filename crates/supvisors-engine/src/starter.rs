// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives ordered startup of one or many applications (§4.3).

use crate::request_sink::RequestSink;
use std::collections::{BTreeMap, HashMap};
use supvisors_core::{
    placement, ApplicationStatus, Context, ProcessStatus, StartingFailureStrategy,
    StartingStrategy,
};
use tracing::{info, warn};

/// An in-flight start request: which node it was issued to, and when it
/// times out if the process never reaches RUNNING.
#[derive(Debug, Clone)]
struct JobEntry {
    identifier: String,
    deadline_ms: u64,
}

/// One application's (or ad-hoc single process's) remaining sub-sequences
/// (§4.3 `planned_sequence`, inner map).
struct Plan {
    strategy: StartingStrategy,
    extra_args: Option<String>,
    remaining: BTreeMap<u32, Vec<String>>,
    current_batch: Vec<String>,
    aborted: bool,
}

/// Synthetic key for a plan covering a whole application vs. a single
/// ad-hoc process (§4.3 distinguishes `start_application`/`start_process`
/// but both are driven by the same sub-sequence machinery here).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PlanKey {
    Application(String),
    Process(String),
}

pub struct Starter {
    plans: HashMap<PlanKey, Plan>,
    current_jobs: HashMap<String, JobEntry>,
    deadline_ms: u64,
    /// Application names the STOP starting-failure-strategy asked to be
    /// handed to the Stopper; drained by the FSM each tick.
    pub stop_requests: Vec<String>,
}

impl Starter {
    pub fn new(deadline_ms: u64) -> Self {
        Self { plans: HashMap::new(), current_jobs: HashMap::new(), deadline_ms, stop_requests: Vec::new() }
    }

    pub fn in_progress(&self) -> bool {
        !self.plans.is_empty() || !self.current_jobs.is_empty()
    }

    /// Application names this Starter currently owns a plan for (§4.5's
    /// `get_job_applications()`).
    pub fn active_applications(&self) -> std::collections::HashSet<String> {
        self.plans
            .keys()
            .map(|key| match key {
                PlanKey::Application(name) => name.clone(),
                PlanKey::Process(namespec) => namespec.split(':').next().unwrap_or(namespec).to_string(),
            })
            .collect()
    }

    /// §4.3 `start_application`. Returns `done=true` if every process is
    /// already running or there is nothing to start.
    pub fn start_application(&mut self, strategy: StartingStrategy, application: &ApplicationStatus, ctx: &Context) -> bool {
        let key = PlanKey::Application(application.application_name.clone());
        let remaining = Self::pending_sequence(&application.start_sequence, ctx);
        if remaining.is_empty() {
            return true;
        }
        self.plans.insert(key, Plan { strategy, extra_args: None, remaining, current_batch: Vec::new(), aborted: false });
        false
    }

    /// §4.3 `start_process`, the single-process variant.
    pub fn start_process(&mut self, strategy: StartingStrategy, process: &ProcessStatus, extra_args: Option<&str>, ctx: &Context) -> bool {
        if ctx.is_process_running(&process.namespec) {
            return true;
        }
        let key = PlanKey::Process(process.namespec.clone());
        let mut remaining = BTreeMap::new();
        remaining.insert(process.rules.start_sequence, vec![process.namespec.clone()]);
        self.plans.insert(
            key,
            Plan { strategy, extra_args: extra_args.map(str::to_string), remaining, current_batch: Vec::new(), aborted: false },
        );
        false
    }

    fn pending_sequence(start_sequence: &BTreeMap<u32, Vec<String>>, ctx: &Context) -> BTreeMap<u32, Vec<String>> {
        let mut remaining = BTreeMap::new();
        for (&seq, namespecs) in start_sequence {
            let pending: Vec<String> = namespecs.iter().filter(|ns| !ctx.is_process_running(ns)).cloned().collect();
            if !pending.is_empty() {
                remaining.insert(seq, pending);
            }
        }
        remaining
    }

    /// Drive one tick: reap completed/failed jobs, apply failure
    /// strategies, issue the next sub-sequence batch. Returns the
    /// application/process keys that finished (successfully or not) this
    /// tick, so the caller (FailureHandler/FSM) can react.
    pub fn tick(&mut self, ctx: &Context, sink: &impl RequestSink, now_ms: u64) -> Vec<String> {
        let mut finished = Vec::new();
        let keys: Vec<PlanKey> = self.plans.keys().cloned().collect();
        for key in keys {
            self.drive_plan(&key, ctx, sink, now_ms);
            let plan_done = self.plans.get(&key).is_some_and(|p| p.current_batch.is_empty() && p.remaining.is_empty());
            if plan_done {
                self.plans.remove(&key);
                finished.push(match key {
                    PlanKey::Application(name) => name,
                    PlanKey::Process(namespec) => namespec,
                });
            }
        }
        finished
    }

    fn drive_plan(&mut self, key: &PlanKey, ctx: &Context, sink: &impl RequestSink, now_ms: u64) {
        self.reap_batch(key, ctx, now_ms);
        let should_pop = {
            let plan = self.plans.get(key).expect("plan present");
            plan.current_batch.is_empty() && !plan.aborted
        };
        if should_pop {
            self.pop_next_batch(key, ctx, sink, now_ms);
        }
    }

    fn reap_batch(&mut self, key: &PlanKey, ctx: &Context, now_ms: u64) {
        let plan = self.plans.get_mut(key).expect("plan present");
        let mut still_pending = Vec::new();
        for namespec in plan.current_batch.drain(..) {
            let Some(process) = ctx.process(&namespec) else {
                self.current_jobs.remove(&namespec);
                continue;
            };
            if process.state().is_running() {
                info!(namespec = %namespec, "starter job succeeded");
                self.current_jobs.remove(&namespec);
                continue;
            }
            let job = self.current_jobs.get(&namespec);
            let failed = process.state().is_fatal_family() || job.is_some_and(|j| now_ms >= j.deadline_ms);
            if failed {
                warn!(namespec = %namespec, "starter job failed");
                self.current_jobs.remove(&namespec);
                Self::apply_failure(plan, &namespec, process.rules.starting_failure_strategy, &mut self.stop_requests);
            } else {
                still_pending.push(namespec);
            }
        }
        plan.current_batch = still_pending;
    }

    fn apply_failure(plan: &mut Plan, namespec: &str, strategy: StartingFailureStrategy, stop_requests: &mut Vec<String>) {
        match strategy {
            StartingFailureStrategy::Abort => {
                plan.aborted = true;
                plan.remaining.clear();
            }
            StartingFailureStrategy::Stop => {
                plan.aborted = true;
                plan.remaining.clear();
                let app_name = namespec.split(':').next().unwrap_or(namespec).to_string();
                stop_requests.push(app_name);
            }
            StartingFailureStrategy::Continue => {}
        }
    }

    fn pop_next_batch(&mut self, key: &PlanKey, ctx: &Context, sink: &impl RequestSink, now_ms: u64) {
        let Some(&seq) = self.plans.get(key).and_then(|p| p.remaining.keys().next()) else { return };
        let plan = self.plans.get_mut(key).expect("plan present");
        let namespecs = plan.remaining.remove(&seq).unwrap_or_default();
        let strategy = plan.strategy;
        let extra_args = plan.extra_args.clone();
        let mut batch = Vec::new();
        for namespec in namespecs {
            let Some(process) = ctx.process(&namespec) else { continue };
            let node = placement::choose_node(
                strategy,
                ctx.mapper(),
                &process.rules.nodes,
                |id| ctx.is_node_running(id),
                ctx.loads(),
                process.rules.expected_load,
            );
            match node {
                Some(identifier) => {
                    sink.push_start_process(&identifier, &namespec, extra_args.as_deref());
                    self.current_jobs.insert(namespec.clone(), JobEntry { identifier, deadline_ms: now_ms + self.deadline_ms });
                    batch.push(namespec);
                }
                None => {
                    warn!(namespec = %namespec, "no eligible node for starting process");
                    let plan = self.plans.get_mut(key).expect("plan present");
                    Self::apply_failure(plan, &namespec, process.rules.starting_failure_strategy, &mut self.stop_requests);
                }
            }
        }
        self.plans.get_mut(key).expect("plan present").current_batch = batch;
    }
}

#[cfg(test)]
#[path = "starter_tests.rs"]
mod tests;
