// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by this crate's tests and by `supvisors-daemon`'s,
//! gated behind `test-support`.

use crate::request_sink::RequestSink;
use parking_lot::Mutex;

/// One call recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    CheckInstance(String),
    StartProcess { identifier: String, namespec: String, extra_args: Option<String> },
    StopProcess { identifier: String, namespec: String },
    Restart(String),
    Shutdown(String),
    RestartSequence(String),
    RestartAll(String),
    ShutdownAll(String),
}

/// An in-memory [`RequestSink`] that just records what it was asked to
/// push, for assertions in Starter/Stopper/FailureHandler/FSM tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

impl RequestSink for RecordingSink {
    fn push_check_instance(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::CheckInstance(identifier.to_string()));
    }

    fn push_start_process(&self, identifier: &str, namespec: &str, extra_args: Option<&str>) {
        self.requests.lock().push(RecordedRequest::StartProcess {
            identifier: identifier.to_string(),
            namespec: namespec.to_string(),
            extra_args: extra_args.map(str::to_string),
        });
    }

    fn push_stop_process(&self, identifier: &str, namespec: &str) {
        self.requests.lock().push(RecordedRequest::StopProcess {
            identifier: identifier.to_string(),
            namespec: namespec.to_string(),
        });
    }

    fn push_restart(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::Restart(identifier.to_string()));
    }

    fn push_shutdown(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::Shutdown(identifier.to_string()));
    }

    fn push_restart_sequence(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::RestartSequence(identifier.to_string()));
    }

    fn push_restart_all(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::RestartAll(identifier.to_string()));
    }

    fn push_shutdown_all(&self, identifier: &str) {
        self.requests.lock().push(RecordedRequest::ShutdownAll(identifier.to_string()));
    }
}
