// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-facing errors (§7 "Transport" kind) and the structured fault
//! codes surfaced to RPC callers (§6 "Fault codes").

use supvisors_engine::EngineError;
use thiserror::Error;

/// Transport-layer failure. Never propagates past the Proxy worker — on
/// error the peer is degraded to `NodeState::Silent` and the failure is
/// only logged (§7: "transport errors are absorbed").
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("rpc to {identifier} timed out after {timeout_ms}ms")]
    Timeout { identifier: String, timeout_ms: u64 },
    #[error("rpc to {identifier} failed: {source}")]
    Connection { identifier: String, #[source] source: Box<dyn std::error::Error + Send + Sync> },
    #[error("outbound queue is closed")]
    QueueClosed,
}

/// §6 fault codes, the structured error surfaced to RPC callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    BadStrategy,
    BadName,
    BadAddress,
    AlreadyStarted,
    NotRunning,
    AbnormalTermination,
    BadExtraArguments,
    BadSupvisorsState,
}

impl From<&EngineError> for FaultCode {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::BadStrategy => FaultCode::BadStrategy,
            EngineError::BadName(_) => FaultCode::BadName,
            EngineError::BadAddress(_) => FaultCode::BadAddress,
            EngineError::AlreadyStarted(_) => FaultCode::AlreadyStarted,
            EngineError::NotRunning(_) => FaultCode::NotRunning,
            EngineError::AbnormalTermination(_) => FaultCode::AbnormalTermination,
            EngineError::BadExtraArguments(_) => FaultCode::BadExtraArguments,
            EngineError::BadSupvisorsState(_) => FaultCode::BadSupvisorsState,
        }
    }
}

/// A contract error as it crosses the RPC surface: the fault code plus the
/// `EngineError`'s human-readable message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RpcFault {
    pub code: FaultCode,
    pub message: String,
}

impl From<EngineError> for RpcFault {
    fn from(err: EngineError) -> Self {
        let code = FaultCode::from(&err);
        RpcFault { code, message: err.to_string() }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
