// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! supvisors-core: the distributed coordination engine's data model.
//!
//! Owns the cluster-wide view — NodeStatus, ProcessStatus,
//! ApplicationStatus — behind a single mutable registry (Context), plus
//! the pure placement-strategy functions that pick a node for a new
//! process. No I/O; the FSM and job engines in `supvisors-engine` drive
//! this model and `supvisors-daemon` feeds it from the wire.

pub mod macros;

pub mod address_mapper;
pub mod application;
pub mod clock;
pub mod context;
pub mod error;
pub mod node;
pub mod placement;
pub mod process;
pub mod rules;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use address_mapper::AddressMapper;
#[cfg(any(test, feature = "test-support"))]
pub use application::ApplicationStatusBuilder;
pub use application::{ApplicationState, ApplicationStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use context::{Context, ProcessReport};
pub use error::ContextError;
#[cfg(any(test, feature = "test-support"))]
pub use node::NodeStatusBuilder;
pub use node::{NodeState, NodeStatus, RemoteProcessInfo};
#[cfg(any(test, feature = "test-support"))]
pub use process::ProcessStatusBuilder;
pub use process::{ProcessState, ProcessStatus};
#[cfg(any(test, feature = "test-support"))]
pub use rules::ProcessRulesBuilder;
pub use rules::{
    ApplicationRules, ConciliationStrategy, ProcessRules, RunningFailureStrategy,
    StartingFailureStrategy, StartingStrategy,
};
