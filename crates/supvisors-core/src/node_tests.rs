use super::*;

#[test]
fn new_node_starts_unknown() {
    let node = NodeStatus::new("10.0.0.1");
    assert_eq!(node.state, NodeState::Unknown);
}

#[test]
fn first_tick_moves_unknown_to_checking() {
    let mut node = NodeStatus::new("10.0.0.1");
    assert!(node.on_tick(100, 100, 1));
    assert_eq!(node.state, NodeState::Checking);
}

#[test]
fn authorize_moves_checking_to_running() {
    let mut node = NodeStatus::new("10.0.0.1");
    node.on_tick(100, 100, 1);
    node.authorize();
    assert_eq!(node.state, NodeState::Running);
}

#[test]
fn stale_tick_is_dropped() {
    let mut node = NodeStatus::new("10.0.0.1");
    node.on_tick(100, 100, 5);
    node.authorize();
    assert!(!node.on_tick(90, 90, 5));
    assert!(!node.on_tick(80, 80, 3));
    assert_eq!(node.remote_time, 100);
}

#[test]
fn newer_tick_is_applied() {
    let mut node = NodeStatus::new("10.0.0.1");
    node.on_tick(100, 100, 1);
    node.authorize();
    assert!(node.on_tick(110, 110, 2));
    assert_eq!(node.remote_time, 110);
}

#[test]
fn on_timer_marks_silent_after_synchro_timeout() {
    let mut node = NodeStatus::builder().state(NodeState::Running).local_time(0).build();
    node.on_timer(10, 5, 2);
    assert_eq!(node.state, NodeState::Silent);
}

#[test]
fn on_timer_progresses_silent_to_isolating_to_isolated() {
    let mut node = NodeStatus::builder().state(NodeState::Silent).build();
    node.on_timer(100, 5, 2);
    assert_eq!(node.state, NodeState::Silent);
    node.on_timer(100, 5, 2);
    assert_eq!(node.state, NodeState::Isolating);
    node.on_timer(100, 5, 2);
    assert_eq!(node.state, NodeState::Isolated);
}

#[test]
fn isolated_is_terminal_for_the_run() {
    let mut node = NodeStatus::builder().state(NodeState::Isolated).build();
    node.on_timer(1000, 5, 2);
    assert_eq!(node.state, NodeState::Isolated);
    assert!(node.state.is_terminal());
}

#[test]
fn mark_isolated_is_immediate() {
    let mut node = NodeStatus::builder().state(NodeState::Running).build();
    node.mark_isolated();
    assert_eq!(node.state, NodeState::Isolated);
}
