// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicates reactive work triggered by a RUNNING application losing a
//! process unexpectedly (§4.5).

use crate::starter::Starter;
use crate::stopper::Stopper;
use std::collections::HashSet;
use supvisors_core::{ApplicationStatus, Context, ProcessStatus, StartingStrategy};
use tracing::info;

/// Priority rank, highest first — `STOP_APPLICATION > RESTART_APPLICATION
/// > RESTART_PROCESS > CONTINUE`. Adding a higher-priority entry for an
/// application/process evicts any strictly-lower-priority one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
    Continue,
    RestartProcess,
    RestartApplication,
    StopApplication,
}

#[derive(Default)]
pub struct FailureHandler {
    stop_application_jobs: HashSet<String>,
    restart_application_jobs: HashSet<String>,
    restart_process_jobs: HashSet<String>,
    continue_process_jobs: HashSet<String>,
    /// Applications/processes waiting for Starter to pick them back up
    /// once their STOPPED state is observed.
    start_application_jobs: HashSet<String>,
    start_process_jobs: HashSet<String>,
}

impl FailureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn priority_of(&self, application_name: &str) -> Priority {
        if self.stop_application_jobs.contains(application_name) {
            Priority::StopApplication
        } else if self.restart_application_jobs.contains(application_name) {
            Priority::RestartApplication
        } else {
            Priority::Continue
        }
    }

    /// Record a STOP_APPLICATION reaction, evicting lower-priority entries
    /// for the same application, at both the application and process level.
    pub fn add_stop_application(&mut self, application_name: &str) {
        if self.priority_of(application_name) > Priority::StopApplication {
            return;
        }
        self.restart_application_jobs.remove(application_name);
        self.evict_process_jobs(application_name);
        self.stop_application_jobs.insert(application_name.to_string());
    }

    /// Record a RESTART_APPLICATION reaction. A process-level job already
    /// queued for one of this application's processes is superseded —
    /// the whole application is about to be stopped and restarted, so any
    /// standalone process restart/continue would otherwise race it.
    pub fn add_restart_application(&mut self, application_name: &str) {
        if self.priority_of(application_name) >= Priority::RestartApplication {
            return;
        }
        self.evict_process_jobs(application_name);
        self.restart_application_jobs.insert(application_name.to_string());
    }

    /// Drop any process-level job (restart, continue, or a restart already
    /// promoted to pending-start) belonging to `application_name`.
    fn evict_process_jobs(&mut self, application_name: &str) {
        self.restart_process_jobs.retain(|ns| owning_application(ns) != application_name);
        self.continue_process_jobs.retain(|ns| owning_application(ns) != application_name);
        self.start_process_jobs.retain(|ns| owning_application(ns) != application_name);
    }

    /// A process-level RESTART_PROCESS is discarded if its application is
    /// already scheduled to stop or restart at the application level.
    pub fn add_restart_process(&mut self, application_name: &str, namespec: &str) {
        if self.priority_of(application_name) >= Priority::RestartApplication {
            return;
        }
        self.continue_process_jobs.remove(namespec);
        self.restart_process_jobs.insert(namespec.to_string());
    }

    pub fn add_continue(&mut self, namespec: &str) {
        if !self.restart_process_jobs.contains(namespec) {
            self.continue_process_jobs.insert(namespec.to_string());
            info!(namespec, "continue strategy: logging only");
        }
    }

    /// Called each FSM tick. Defers any action whose application is still
    /// owned by Starter/Stopper; otherwise issues Stopper for
    /// stop/restart items, and once an application/process has actually
    /// reached STOPPED, hands it to Starter.
    pub fn trigger_jobs(
        &mut self,
        ctx: &Context,
        starter: &mut Starter,
        stopper: &mut Stopper,
        in_progress: impl Fn(&str) -> bool,
    ) {
        let stop_now: Vec<String> = self.stop_application_jobs.iter().filter(|a| !in_progress(a)).cloned().collect();
        for application_name in stop_now {
            if let Some(application) = ctx.application(&application_name) {
                stopper.stop_application(application, ctx);
            }
            self.stop_application_jobs.remove(&application_name);
        }

        let restart_now: Vec<String> = self.restart_application_jobs.iter().filter(|a| !in_progress(a)).cloned().collect();
        for application_name in restart_now {
            if let Some(application) = ctx.application(&application_name) {
                stopper.stop_application(application, ctx);
            }
            self.restart_application_jobs.remove(&application_name);
            self.start_application_jobs.insert(application_name);
        }

        let restart_process_now: Vec<String> = self.restart_process_jobs.iter().filter(|ns| !in_progress(owning_application(ns))).cloned().collect();
        for namespec in restart_process_now {
            if let Some(process) = ctx.process(&namespec) {
                stopper.stop_process(process, ctx);
            }
            self.restart_process_jobs.remove(&namespec);
            self.start_process_jobs.insert(namespec);
        }

        let ready_applications: Vec<String> = self
            .start_application_jobs
            .iter()
            .filter(|a| ctx.application_state(a) == supvisors_core::ApplicationState::Stopped)
            .cloned()
            .collect();
        for application_name in ready_applications {
            if let Some(application) = ctx.application(&application_name) {
                starter.start_application(StartingStrategy::Config, application, ctx);
            }
            self.start_application_jobs.remove(&application_name);
        }

        let ready_processes: Vec<String> = self
            .start_process_jobs
            .iter()
            .filter(|ns| !ctx.is_process_running(ns))
            .cloned()
            .collect();
        for namespec in ready_processes {
            if let Some(process) = ctx.process(&namespec) {
                if process.state().is_stopped_family() {
                    starter.start_process(StartingStrategy::Config, process, None, ctx);
                    self.start_process_jobs.remove(&namespec);
                }
            } else {
                self.start_process_jobs.remove(&namespec);
            }
        }
    }

    /// React to a required/non-required process leaving RUNNING per the
    /// owning application's or process's configured failure strategy.
    pub fn handle_running_failure(&mut self, application: &ApplicationStatus, process: &ProcessStatus) {
        use supvisors_core::RunningFailureStrategy::*;
        match process.rules.running_failure_strategy {
            StopApplication => self.add_stop_application(&application.application_name),
            RestartApplication => self.add_restart_application(&application.application_name),
            RestartProcess => self.add_restart_process(&application.application_name, &process.namespec),
            Continue => self.add_continue(&process.namespec),
        }
    }
}

fn owning_application(namespec: &str) -> &str {
    namespec.split(':').next().unwrap_or(namespec)
}

#[cfg(test)]
#[path = "failure_handler_tests.rs"]
mod tests;
