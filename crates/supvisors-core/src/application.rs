// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Groups processes; derives application state and failure flags (§3).
//!
//! Per the Context/ApplicationStatus/ProcessStatus cycle design note
//! (§9), an ApplicationStatus never owns ProcessStatus directly — it
//! references member processes by namespec, resolved through
//! [`crate::context::Context`].

use crate::process::ProcessState;
use crate::rules::{ApplicationRules, ProcessRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived application state (§3 invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

crate::simple_display! {
    ApplicationState {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
    }
}

/// §3 invariant 1: priority order any-STOPPING > any-STARTING/BACKOFF >
/// any-RUNNING > else STOPPED.
pub fn derive_state<'a>(process_states: impl Iterator<Item = &'a ProcessState>) -> ApplicationState {
    let mut any_stopping = false;
    let mut any_starting = false;
    let mut any_running = false;
    for state in process_states {
        match state {
            ProcessState::Stopping => any_stopping = true,
            ProcessState::Starting | ProcessState::Backoff => any_starting = true,
            ProcessState::Running => any_running = true,
            _ => {}
        }
    }
    if any_stopping {
        ApplicationState::Stopping
    } else if any_starting {
        ApplicationState::Starting
    } else if any_running {
        ApplicationState::Running
    } else {
        ApplicationState::Stopped
    }
}

/// §3 invariant 2. `application_state` is the already-derived state so
/// the "while running" qualifier can be applied precisely.
pub fn derive_failures<'a>(
    application_state: ApplicationState,
    processes: impl Iterator<Item = (&'a ProcessState, &'a ProcessRules)>,
) -> (bool, bool) {
    let mut major_failure = false;
    let mut minor_failure = false;
    let running = matches!(application_state, ApplicationState::Running | ApplicationState::Starting);
    for (state, rules) in processes {
        if !running {
            continue;
        }
        if rules.required && state.is_stopped_family() {
            major_failure = true;
        } else if !rules.required && matches!(state, ProcessState::Exited | ProcessState::Fatal) {
            minor_failure = true;
        }
    }
    (major_failure, minor_failure)
}

/// Groups processes under one application name; holds ordered start/stop
/// sequences keyed by `ProcessRules::start_sequence` /
/// `ProcessRules::stop_sequence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub application_name: String,
    pub rules: ApplicationRules,
    /// All namespecs that belong to this application, insertion order.
    pub process_namespecs: Vec<String>,
    /// sequence value -> namespecs entered at that position.
    pub start_sequence: BTreeMap<u32, Vec<String>>,
    pub stop_sequence: BTreeMap<u32, Vec<String>>,
}

impl ApplicationStatus {
    pub fn new(application_name: impl Into<String>, rules: ApplicationRules) -> Self {
        Self {
            application_name: application_name.into(),
            rules,
            process_namespecs: Vec::new(),
            start_sequence: BTreeMap::new(),
            stop_sequence: BTreeMap::new(),
        }
    }

    /// Register a process as a member, placing it in the start/stop
    /// sequence maps according to its rules. `0` is a valid, first-ordered
    /// sequence value, not a sentinel for exclusion (see DESIGN.md).
    pub fn add_process(&mut self, namespec: impl Into<String>, rules: &ProcessRules) {
        let namespec = namespec.into();
        if !self.process_namespecs.contains(&namespec) {
            self.process_namespecs.push(namespec.clone());
        }
        self.start_sequence.entry(rules.start_sequence).or_default().push(namespec.clone());
        self.stop_sequence.entry(rules.stop_sequence).or_default().push(namespec);
    }

    pub fn is_managed(&self) -> bool {
        self.rules.managed
    }
}

crate::builder! {
    pub struct ApplicationStatusBuilder => ApplicationStatus {
        into {
            application_name: String = "myapp",
        }
        set {
            rules: ApplicationRules = ApplicationRules::default(),
            process_namespecs: Vec<String> = Vec::new(),
            start_sequence: BTreeMap<u32, Vec<String>> = BTreeMap::new(),
            stop_sequence: BTreeMap<u32, Vec<String>> = BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
