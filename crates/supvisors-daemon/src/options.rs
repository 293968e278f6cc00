// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration, threaded through constructors rather than read
//! from a module-level global (§9 design note: "no process-wide mutable
//! globals").

use std::time::Duration;
use supvisors_core::{ConciliationStrategy, StartingStrategy};

/// All tunables a `Supervisors` instance needs. Construct once (typically
/// from environment variables, mirroring the teacher's `env` module) and
/// pass by value into [`crate::supervisors::Supervisors::new`].
#[derive(Debug, Clone)]
pub struct SupervisorsOptions {
    /// Configured node identifiers, in configuration order (fed to
    /// [`supvisors_core::AddressMapper`]).
    pub node_identifiers: Vec<String>,
    pub local_identifier: String,
    /// Seconds without a tick before a node is marked SILENT.
    pub synchro_timeout_secs: u64,
    /// Consecutive silent ticks before SILENT -> ISOLATING -> ISOLATED.
    pub isolation_ticks: u32,
    /// Cadence of the control-thread tick loop.
    pub tick_period: Duration,
    /// Per-outbound-RPC deadline (§5: "default: the tick period").
    pub rpc_timeout: Duration,
    /// Per-process start/stop deadline used by the Starter/Stopper.
    pub process_deadline: Duration,
    pub default_starting_strategy: StartingStrategy,
    pub default_conciliation_strategy: ConciliationStrategy,
}

impl SupervisorsOptions {
    /// Reads `SUPVISORS_*` environment variables, falling back to the
    /// documented defaults (mirrors the teacher's `env.rs` convention of
    /// one function per setting with an env override and a hardcoded
    /// fallback).
    pub fn from_env(node_identifiers: Vec<String>, local_identifier: impl Into<String>) -> Self {
        Self {
            node_identifiers,
            local_identifier: local_identifier.into(),
            synchro_timeout_secs: env_u64("SUPVISORS_SYNCHRO_TIMEOUT_SECS", 15),
            isolation_ticks: env_u64("SUPVISORS_ISOLATION_TICKS", 2) as u32,
            tick_period: Duration::from_millis(env_u64("SUPVISORS_TICK_PERIOD_MS", 5_000)),
            rpc_timeout: Duration::from_millis(env_u64("SUPVISORS_RPC_TIMEOUT_MS", 5_000)),
            process_deadline: Duration::from_millis(env_u64("SUPVISORS_PROCESS_DEADLINE_MS", 10_000)),
            default_starting_strategy: StartingStrategy::Config,
            default_conciliation_strategy: ConciliationStrategy::User,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
