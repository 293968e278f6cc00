// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invariant-violation errors (§7 "Invariant violation" error kind).
//!
//! These never cross the control-thread/worker boundary; callers log
//! them with full context and continue the current FSM tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("unknown node identifier: {0}")]
    UnknownNode(String),
    #[error("unknown process namespec: {0}")]
    UnknownProcess(String),
    #[error("unknown application: {0}")]
    UnknownApplication(String),
}
