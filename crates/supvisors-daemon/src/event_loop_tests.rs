use super::*;
use crate::protocol::ProcessPayload;
use supvisors_core::test_support::two_node_context;
use supvisors_core::{ConciliationStrategy, ProcessState};
use supvisors_engine::test_support::RecordingSink;

fn new_event_loop() -> EventLoop {
    EventLoop::new(TickOptions { tick_period_ms: 1_000, synchro_timeout_secs: 10, isolation_ticks: 2 })
}

#[test]
fn tick_event_authorizes_node_towards_running() {
    let mut ctx = two_node_context();
    let mut fsm = Fsm::new(ConciliationStrategy::User, 5_000);
    let sink = RecordingSink::new();
    let el = new_event_loop();

    el.drain_and_tick(vec![PeerEvent::Tick { identifier: "A".into(), when: 0, sequence_counter: 1 }], &mut ctx, &mut fsm, &sink, 0);
    assert!(!ctx.is_node_running("A"), "authorization still needs the explicit Authorization event");

    el.drain_and_tick(vec![PeerEvent::Authorization { peer: "A".into(), allowed: true }], &mut ctx, &mut fsm, &sink, 0);
    assert!(ctx.is_node_running("A"));
}

#[test]
fn tick_event_records_real_receipt_time_not_the_peers_self_reported_clock() {
    let mut ctx = two_node_context();
    let mut fsm = Fsm::new(ConciliationStrategy::User, 5_000);
    let sink = RecordingSink::new();
    let el = new_event_loop();

    // The peer claims `when=999_999` (its own, possibly skewed, clock);
    // local receipt is at `now_ms=12_345_000` (12_345s).
    el.drain_and_tick(
        vec![PeerEvent::Tick { identifier: "A".into(), when: 999_999, sequence_counter: 1 }],
        &mut ctx,
        &mut fsm,
        &sink,
        12_345_000,
    );

    let node = ctx.node("A").unwrap();
    assert_eq!(node.remote_time, 999_999, "remote_time still reflects the peer's own report");
    assert_eq!(node.local_time, 12_345, "local_time must be derived from this node's receipt clock, not the peer's");
}

#[test]
fn authorization_denied_marks_peer_isolated() {
    let mut ctx = two_node_context();
    let mut fsm = Fsm::new(ConciliationStrategy::User, 5_000);
    let sink = RecordingSink::new();
    let el = new_event_loop();

    el.drain_and_tick(vec![PeerEvent::Tick { identifier: "B".into(), when: 0, sequence_counter: 1 }], &mut ctx, &mut fsm, &sink, 0);
    el.drain_and_tick(vec![PeerEvent::Authorization { peer: "B".into(), allowed: false }], &mut ctx, &mut fsm, &sink, 0);

    assert_eq!(ctx.node("B").unwrap().state, supvisors_core::NodeState::Isolated);
}

#[test]
fn process_event_updates_context_process_info() {
    let mut ctx = two_node_context();
    ctx.register_process("app:p1", Default::default(), Default::default());
    let mut fsm = Fsm::new(ConciliationStrategy::User, 5_000);
    let sink = RecordingSink::new();
    let el = new_event_loop();

    let payload = ProcessPayload { namespec: "app:p1".into(), state: ProcessState::Running, uptime: 1, expected_exit: false, pid: Some(42) };
    el.drain_and_tick(vec![PeerEvent::Process { identifier: "A".into(), payload }], &mut ctx, &mut fsm, &sink, 0);

    assert!(ctx.is_process_running("app:p1"));
}

#[test]
fn remote_info_event_loads_every_reported_process() {
    let mut ctx = two_node_context();
    ctx.register_process("app:p1", Default::default(), Default::default());
    ctx.register_process("app:p2", Default::default(), Default::default());
    let mut fsm = Fsm::new(ConciliationStrategy::User, 5_000);
    let sink = RecordingSink::new();
    let el = new_event_loop();

    let process_list = vec![
        ProcessPayload { namespec: "app:p1".into(), state: ProcessState::Running, uptime: 1, expected_exit: false, pid: Some(1) },
        ProcessPayload { namespec: "app:p2".into(), state: ProcessState::Running, uptime: 1, expected_exit: false, pid: Some(2) },
    ];
    el.drain_and_tick(vec![PeerEvent::RemoteInfo { peer: "A".into(), process_list }], &mut ctx, &mut fsm, &sink, 0);

    assert!(ctx.is_process_running("app:p1"));
    assert!(ctx.is_process_running("app:p2"));
}
