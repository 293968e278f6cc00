// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The duplex channel contract a peer transport must satisfy (§1, §4.8).
//! `supvisors-core`/`supvisors-engine` never depend on this directly; only
//! the Proxy does, so any transport satisfying this trait works (§1: "any
//! transport satisfying §6 works").

use crate::error::ProxyError;
use crate::protocol::ProcessPayload;
use async_trait::async_trait;

/// One peer's local supervisor agent, as seen over the wire. Every method
/// corresponds to an outbound RPC kind from §4.8 and carries its own
/// per-call deadline (§5): implementations must not block past it.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Probes the remote's view of the local node. `Ok(true)` means the
    /// remote still authorizes the local node; `Ok(false)` means the
    /// remote reports it ISOLATING/ISOLATED (§4.8).
    async fn check_instance(&self, identifier: &str) -> Result<bool, ProxyError>;

    /// Fetches the remote's full process list, called after a successful
    /// `check_instance` (§4.8).
    async fn get_all_process_info(&self, identifier: &str) -> Result<Vec<ProcessPayload>, ProxyError>;

    async fn start_process(&self, identifier: &str, namespec: &str, extra_args: Option<&str>) -> Result<(), ProxyError>;

    async fn stop_process(&self, identifier: &str, namespec: &str) -> Result<(), ProxyError>;

    async fn restart(&self, identifier: &str) -> Result<(), ProxyError>;

    async fn shutdown(&self, identifier: &str) -> Result<(), ProxyError>;

    async fn restart_sequence(&self, identifier: &str) -> Result<(), ProxyError>;

    async fn restart_all(&self, identifier: &str) -> Result<(), ProxyError>;

    async fn shutdown_all(&self, identifier: &str) -> Result<(), ProxyError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! An in-memory [`PeerTransport`] recording every call, for the
    //! Proxy's own tests and `supvisors-specs`' end-to-end scenarios.
    //! Grounded in the teacher's `FakeAdapter` convention.

    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum FakeCall {
        CheckInstance(String),
        GetAllProcessInfo(String),
        StartProcess { identifier: String, namespec: String, extra_args: Option<String> },
        StopProcess { identifier: String, namespec: String },
        Restart(String),
        Shutdown(String),
        RestartSequence(String),
        RestartAll(String),
        ShutdownAll(String),
    }

    #[derive(Default)]
    pub struct FakePeerTransport {
        calls: Mutex<Vec<FakeCall>>,
        /// Identifiers for which `check_instance` should report the local
        /// node as un-authorized (simulating S5's isolation scenario).
        deny_authorization: Mutex<std::collections::HashSet<String>>,
        process_lists: Mutex<std::collections::HashMap<String, Vec<ProcessPayload>>>,
    }

    impl FakePeerTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<FakeCall> {
            self.calls.lock().clone()
        }

        pub fn deny_authorization_from(&self, identifier: impl Into<String>) {
            self.deny_authorization.lock().insert(identifier.into());
        }

        pub fn set_process_list(&self, identifier: impl Into<String>, list: Vec<ProcessPayload>) {
            self.process_lists.lock().insert(identifier.into(), list);
        }
    }

    #[async_trait]
    impl PeerTransport for FakePeerTransport {
        async fn check_instance(&self, identifier: &str) -> Result<bool, ProxyError> {
            self.calls.lock().push(FakeCall::CheckInstance(identifier.to_string()));
            Ok(!self.deny_authorization.lock().contains(identifier))
        }

        async fn get_all_process_info(&self, identifier: &str) -> Result<Vec<ProcessPayload>, ProxyError> {
            self.calls.lock().push(FakeCall::GetAllProcessInfo(identifier.to_string()));
            Ok(self.process_lists.lock().get(identifier).cloned().unwrap_or_default())
        }

        async fn start_process(&self, identifier: &str, namespec: &str, extra_args: Option<&str>) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::StartProcess {
                identifier: identifier.to_string(),
                namespec: namespec.to_string(),
                extra_args: extra_args.map(str::to_string),
            });
            Ok(())
        }

        async fn stop_process(&self, identifier: &str, namespec: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::StopProcess { identifier: identifier.to_string(), namespec: namespec.to_string() });
            Ok(())
        }

        async fn restart(&self, identifier: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::Restart(identifier.to_string()));
            Ok(())
        }

        async fn shutdown(&self, identifier: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::Shutdown(identifier.to_string()));
            Ok(())
        }

        async fn restart_sequence(&self, identifier: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::RestartSequence(identifier.to_string()));
            Ok(())
        }

        async fn restart_all(&self, identifier: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::RestartAll(identifier.to_string()));
            Ok(())
        }

        async fn shutdown_all(&self, identifier: &str) -> Result<(), ProxyError> {
            self.calls.lock().push(FakeCall::ShutdownAll(identifier.to_string()));
            Ok(())
        }
    }
}
