// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mirror of [`crate::starter::Starter`] driving ordered shutdown (§4.4).

use crate::request_sink::RequestSink;
use std::collections::{BTreeMap, HashMap};
use supvisors_core::{ApplicationStatus, Context, ProcessStatus};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct JobEntry {
    deadline_ms: u64,
}

struct Plan {
    remaining: BTreeMap<u32, Vec<String>>,
    current_batch: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PlanKey {
    Application(String),
    Process(String),
}

pub struct Stopper {
    plans: HashMap<PlanKey, Plan>,
    current_jobs: HashMap<String, JobEntry>,
    deadline_ms: u64,
}

impl Stopper {
    pub fn new(deadline_ms: u64) -> Self {
        Self { plans: HashMap::new(), current_jobs: HashMap::new(), deadline_ms }
    }

    pub fn in_progress(&self) -> bool {
        !self.plans.is_empty() || !self.current_jobs.is_empty()
    }

    /// Application names this Stopper currently owns a plan for (§4.5's
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

    /// §4.4 `stop_application`. `done=true` if nothing is running.
    pub fn stop_application(&mut self, application: &ApplicationStatus, ctx: &Context) -> bool {
        let remaining = Self::pending_sequence(&application.stop_sequence, ctx);
        if remaining.is_empty() {
            return true;
        }
        self.plans.insert(PlanKey::Application(application.application_name.clone()), Plan { remaining, current_batch: Vec::new() });
        false
    }

    pub fn stop_process(&mut self, process: &ProcessStatus, ctx: &Context) -> bool {
        if ctx.process(&process.namespec).map(|p| p.running_identifiers().is_empty()).unwrap_or(true) {
            return true;
        }
        let mut remaining = BTreeMap::new();
        remaining.insert(process.rules.stop_sequence, vec![process.namespec.clone()]);
        self.plans.insert(PlanKey::Process(process.namespec.clone()), Plan { remaining, current_batch: Vec::new() });
        false
    }

    fn pending_sequence(stop_sequence: &BTreeMap<u32, Vec<String>>, ctx: &Context) -> BTreeMap<u32, Vec<String>> {
        let mut remaining = BTreeMap::new();
        for (&seq, namespecs) in stop_sequence {
            let pending: Vec<String> = namespecs
                .iter()
                .filter(|ns| ctx.process(ns.as_str()).map(|p| !p.running_identifiers().is_empty()).unwrap_or(false))
                .cloned()
                .collect();
            if !pending.is_empty() {
                remaining.insert(seq, pending);
            }
        }
        remaining
    }

    /// Drive one tick; returns application/process keys that finished.
    pub fn tick(&mut self, ctx: &Context, sink: &impl RequestSink, now_ms: u64) -> Vec<String> {
        let mut finished = Vec::new();
        let keys: Vec<PlanKey> = self.plans.keys().cloned().collect();
        for key in keys {
            self.reap_batch(&key, ctx, now_ms);
            let should_pop = self.plans.get(&key).is_some_and(|p| p.current_batch.is_empty());
            if should_pop {
                self.pop_next_batch(&key, ctx, sink, now_ms);
            }
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

    fn reap_batch(&mut self, key: &PlanKey, ctx: &Context, now_ms: u64) {
        let plan = self.plans.get_mut(key).expect("plan present");
        let mut still_pending = Vec::new();
        for namespec in plan.current_batch.drain(..) {
            let aggregate_stopped = ctx.process(&namespec).map(|p| p.running_identifiers().is_empty()).unwrap_or(true);
            let job = self.current_jobs.get(&namespec);
            let timed_out = job.is_some_and(|j| now_ms >= j.deadline_ms);
            if aggregate_stopped {
                info!(namespec = %namespec, "stopper job completed");
                self.current_jobs.remove(&namespec);
            } else if timed_out {
                warn!(namespec = %namespec, "stopper job timed out, reporting completion anyway");
                self.current_jobs.remove(&namespec);
            } else {
                still_pending.push(namespec);
            }
        }
        plan.current_batch = still_pending;
    }

    fn pop_next_batch(&mut self, key: &PlanKey, ctx: &Context, sink: &impl RequestSink, now_ms: u64) {
        let Some(&seq) = self.plans.get(key).and_then(|p| p.remaining.keys().next()) else { return };
        let plan = self.plans.get_mut(key).expect("plan present");
        let namespecs = plan.remaining.remove(&seq).unwrap_or_default();
        let mut batch = Vec::new();
        for namespec in namespecs {
            let Some(process) = ctx.process(&namespec) else { continue };
            for identifier in process.running_identifiers() {
                sink.push_stop_process(identifier, &namespec);
            }
            self.current_jobs.insert(namespec.clone(), JobEntry { deadline_ms: now_ms + self.deadline_ms });
            batch.push(namespec);
        }
        self.plans.get_mut(key).expect("plan present").current_batch = batch;
    }
}

#[cfg(test)]
#[path = "stopper_tests.rs"]
mod tests;
