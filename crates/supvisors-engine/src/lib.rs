// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! supvisors-engine: the job-scheduling and FSM layer driving a
//! `supvisors-core::Context` (§4.3-§4.7).
//!
//! No I/O of its own — outbound RPCs are deferred through
//! [`request_sink::RequestSink`], implemented by `supvisors-daemon`'s
//! Proxy over the real peer transport.

pub mod conciliation;
pub mod error;
pub mod failure_handler;
pub mod fsm;
pub mod request_sink;
pub mod starter;
pub mod stopper;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::EngineError;
pub use failure_handler::FailureHandler;
pub use fsm::{Fsm, FsmState};
pub use request_sink::RequestSink;
pub use starter::Starter;
pub use stopper::Stopper;
