// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end boundary scenarios from spec.md §8, driven through the full
//! `supvisors-daemon` stack (Supervisors + EventLoop + Proxy) against a
//! `FakePeerTransport` rather than against the lower-level engine types
//! directly.

use std::sync::Arc;
use std::time::Duration;
use supvisors_core::{NodeState, ProcessRules, ProcessState};
use supvisors_daemon::peer_transport::fake::{FakeCall, FakePeerTransport};
use supvisors_daemon::{PeerEvent, ProcessPayload, Supervisors, SupervisorsOptions};
use tokio::sync::mpsc;

fn options(identifiers: &[&str], local: &str) -> SupervisorsOptions {
    SupervisorsOptions::from_env(identifiers.iter().map(|s| s.to_string()).collect(), local)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// S4 — deployment ordering: the second step of a start sequence is only
/// issued once the first has reached RUNNING.
#[tokio::test]
async fn s4_deployment_respects_start_sequence_ordering() {
    let transport = Arc::new(FakePeerTransport::new());
    let (inbound_tx, _inbound_rx) = mpsc::channel(32);
    let mut supervisors = Supervisors::new(options(&["A", "B"], "A"), transport.clone(), inbound_tx);

    supervisors.register_process(
        "app:q1",
        Default::default(),
        ProcessRules::builder().nodes(vec!["A".into()]).start_sequence(1).expected_load(10).build(),
    );
    supervisors.register_process(
        "app:q2",
        Default::default(),
        ProcessRules::builder().nodes(vec!["A".into()]).start_sequence(2).expected_load(10).build(),
    );

    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "A".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "A".into(), allowed: true },
            PeerEvent::Tick { identifier: "B".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "B".into(), allowed: true },
        ],
        0,
    );
    // Deployment entry only builds the plan; the first tick that actually
    // drives the starter is the next one.
    supervisors.tick(vec![], 0);
    settle().await;
    let start_calls: Vec<_> = transport.calls().into_iter().filter(|c| matches!(c, FakeCall::StartProcess { .. })).collect();
    similar_asserts::assert_eq!(start_calls, vec![FakeCall::StartProcess { identifier: "A".into(), namespec: "app:q1".into(), extra_args: None }]);

    supervisors.tick(
        vec![PeerEvent::Process {
            identifier: "A".into(),
            payload: ProcessPayload { namespec: "app:q1".into(), state: ProcessState::Running, uptime: 1, expected_exit: false, pid: Some(1) },
        }],
        0,
    );
    settle().await;

    let calls = transport.calls();
    assert!(
        calls.contains(&FakeCall::StartProcess { identifier: "A".into(), namespec: "app:q2".into(), extra_args: None }),
        "app:q2 should only start once app:q1 is running, got {calls:?}"
    );
}

/// S5 — a peer reporting the local node as unauthorized marks it ISOLATED;
/// the event loop never re-authorizes it from a later tick alone.
#[tokio::test]
async fn s5_denied_authorization_isolates_the_peer() {
    let transport = Arc::new(FakePeerTransport::new());
    let (inbound_tx, _inbound_rx) = mpsc::channel(32);
    let mut supervisors = Supervisors::new(options(&["A", "B"], "A"), transport, inbound_tx);

    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "B".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "B".into(), allowed: false },
        ],
        0,
    );

    assert_eq!(supervisors.context().node("B").expect("node B exists").state, NodeState::Isolated);

    // A further tick from B alone does not lift isolation.
    supervisors.tick(vec![PeerEvent::Tick { identifier: "B".into(), when: 1, sequence_counter: 2 }], 1_000);
    assert_eq!(supervisors.context().node("B").expect("node B exists").state, NodeState::Isolated);
}

/// S6 — the master is the lexicographically smallest RUNNING identifier at
/// the instant DEPLOYMENT is entered, regardless of arrival order; losing
/// it resets the FSM to INITIALIZATION.
#[tokio::test]
async fn s6_master_pinned_lexicographically_then_reset_on_loss() {
    let transport = Arc::new(FakePeerTransport::new());
    let (inbound_tx, _inbound_rx) = mpsc::channel(32);
    let mut supervisors = Supervisors::new(options(&["A", "B", "C"], "A"), transport, inbound_tx);

    // Nodes authorize in arrival order C, A, B.
    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "C".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "C".into(), allowed: true },
        ],
        0,
    );
    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "A".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "A".into(), allowed: true },
        ],
        0,
    );
    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "B".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "B".into(), allowed: true },
        ],
        0,
    );

    assert_eq!(supervisors.master_identifier(), Some("A"));

    // Master (A) goes silent for long enough to be isolated/lost.
    for tick in 1..100 {
        supervisors.tick(vec![], tick * 60_000);
    }
    assert_eq!(supervisors.master_identifier(), None, "losing the pinned master resets the fsm to initialization");
}
