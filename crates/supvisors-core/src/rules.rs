// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule and strategy enums consumed from a populated rules structure.
//!
//! Parsing the rules file is out of scope (§1); this module only defines
//! the closed-set vocabulary the engine dispatches on.

use serde::{Deserialize, Serialize};

/// Placement strategy family (§4.2). Closed set, dispatched via
/// [`crate::placement::choose_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingStrategy {
    Config,
    LessLoaded,
    MostLoaded,
    Local,
}

crate::simple_display! {
    StartingStrategy {
        Config => "config",
        LessLoaded => "less_loaded",
        MostLoaded => "most_loaded",
        Local => "local",
    }
}

/// Reaction to a process failing while the Starter is still bringing it up (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingFailureStrategy {
    /// Cancel the rest of the application's start sequence.
    Abort,
    /// Cancel the sequence and push the application to the Stopper.
    Stop,
    /// Ignore the failure and advance to the next sub-sequence.
    Continue,
}

crate::simple_display! {
    StartingFailureStrategy {
        Abort => "abort",
        Stop => "stop",
        Continue => "continue",
    }
}

/// Reaction to a process of a running application unexpectedly leaving
/// RUNNING (§4.5). Dispatched by the FailureHandler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningFailureStrategy {
    StopApplication,
    RestartApplication,
    RestartProcess,
    /// Log only; no corrective action.
    Continue,
}

crate::simple_display! {
    RunningFailureStrategy {
        StopApplication => "stop_application",
        RestartApplication => "restart_application",
        RestartProcess => "restart_process",
        Continue => "continue",
    }
}

/// Conciliation strategy (§4.6), chosen once for the whole cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConciliationStrategy {
    /// Keep the running instance with the largest uptime; stop the rest.
    Senicide,
    /// Keep the running instance with the smallest uptime; stop the rest.
    Infanticide,
    /// No automatic action; left for manual resolution.
    User,
    /// Stop every running instance.
    Stop,
    /// Stop every running instance, then restart the process once via
    /// the FailureHandler.
    Restart,
    /// Stop every running instance, then apply each process's own
    /// `running_failure_strategy` via the FailureHandler.
    RunningFailure,
}

crate::simple_display! {
    ConciliationStrategy {
        Senicide => "senicide",
        Infanticide => "infanticide",
        User => "user",
        Stop => "stop",
        Restart => "restart",
        RunningFailure => "running_failure",
    }
}

/// Per-process rules plus the application-level rules it inherits (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRules {
    /// Allowed placements for this process. Empty means "no allowed node"
    /// (the process can never be started).
    pub nodes: Vec<String>,
    /// Position within the owning application's start_sequence map. `0` is
    /// a valid, first-ordered position, not an exclusion sentinel — a
    /// process with `start_sequence = 0` starts before one at `1`.
    pub start_sequence: u32,
    /// Position within the owning application's stop_sequence map.
    pub stop_sequence: u32,
    /// A required process failing to start/keep-running sets
    /// `ApplicationStatus.major_failure`.
    pub required: bool,
    /// Whether the Starter should wait for the process to exit (rather
    /// than just reach RUNNING) before considering a step "started".
    pub wait_exit: bool,
    /// Load contributed to a node's `load` while this process is
    /// RUNNING/STARTING there. 0-100 scale, see §4.2.
    pub expected_load: u32,
    /// Whether `extra_args` may be supplied on `start_process`.
    pub extra_args_allowed: bool,
    pub starting_failure_strategy: StartingFailureStrategy,
    pub running_failure_strategy: RunningFailureStrategy,
}

impl Default for ProcessRules {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            start_sequence: 0,
            stop_sequence: 0,
            required: false,
            wait_exit: false,
            expected_load: 0,
            extra_args_allowed: false,
            starting_failure_strategy: StartingFailureStrategy::Abort,
            running_failure_strategy: RunningFailureStrategy::Continue,
        }
    }
}

crate::builder! {
    pub struct ProcessRulesBuilder => ProcessRules {
        set {
            nodes: Vec<String> = Vec::new(),
            start_sequence: u32 = 1,
            stop_sequence: u32 = 1,
            required: bool = false,
            wait_exit: bool = false,
            expected_load: u32 = 0,
            extra_args_allowed: bool = false,
            starting_failure_strategy: StartingFailureStrategy = StartingFailureStrategy::Abort,
            running_failure_strategy: RunningFailureStrategy = RunningFailureStrategy::Continue,
        }
    }
}

/// Application-level rules (§3): sequencing is carried on
/// [`crate::application::ApplicationStatus`] itself since it is derived
/// from the member processes' own sequences; this struct holds the
/// remaining application-wide knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRules {
    /// A managed application (`start_sequence > 0`) is subject to
    /// deployment and coordinated failure handling.
    pub managed: bool,
    pub starting_failure_strategy: StartingFailureStrategy,
    pub running_failure_strategy: RunningFailureStrategy,
}

impl Default for ApplicationRules {
    fn default() -> Self {
        Self {
            managed: true,
            starting_failure_strategy: StartingFailureStrategy::Continue,
            running_failure_strategy: RunningFailureStrategy::Continue,
        }
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
