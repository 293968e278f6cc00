// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contract errors surfaced to the RPC caller (§7 "Contract" error kind,
//! §6 fault codes).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown strategy")]
    BadStrategy,
    #[error("unknown name: {0}")]
    BadName(String),
    #[error("unknown address: {0}")]
    BadAddress(String),
    #[error("already started: {0}")]
    AlreadyStarted(String),
    #[error("not running: {0}")]
    NotRunning(String),
    #[error("abnormal termination: {0}")]
    AbnormalTermination(String),
    #[error("extra arguments not allowed: {0}")]
    BadExtraArguments(String),
    #[error("forbidden in supvisors state {0}")]
    BadSupvisorsState(String),
}
