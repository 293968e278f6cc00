use super::*;

fn info(state: ProcessState) -> RemoteProcessInfo {
    RemoteProcessInfo { state, uptime: 0, expected_exit: false, pid: Some(1) }
}

#[test]
fn aggregate_prefers_running_over_everything() {
    let states = vec![ProcessState::Stopped, ProcessState::Running, ProcessState::Fatal];
    assert_eq!(aggregate_state(states.iter()), ProcessState::Running);
}

#[test]
fn aggregate_with_no_reporters_is_stopped() {
    assert_eq!(aggregate_state(std::iter::empty()), ProcessState::Stopped);
}

#[test]
fn conflicting_when_running_on_more_than_one_node() {
    let mut p = ProcessStatus::new("app:proc", ProcessRules::default());
    p.set_node_info("10.0.0.1", info(ProcessState::Running));
    assert!(!p.is_conflicting());
    p.set_node_info("10.0.0.2", info(ProcessState::Running));
    assert!(p.is_conflicting());
    assert_eq!(p.running_identifiers().len(), 2);
}

#[test]
fn remove_node_drops_its_slice_and_recomputes() {
    let mut p = ProcessStatus::new("app:proc", ProcessRules::default());
    p.set_node_info("10.0.0.1", info(ProcessState::Running));
    p.set_node_info("10.0.0.2", info(ProcessState::Running));
    assert!(p.is_conflicting());
    p.remove_node("10.0.0.2");
    assert!(!p.is_conflicting());
    assert_eq!(p.state(), ProcessState::Running);
}

#[test]
fn allows_node_checks_rules() {
    let rules = ProcessRules::builder().nodes(vec!["10.0.0.1".to_string()]).build();
    let p = ProcessStatus::new("app:proc", rules);
    assert!(p.allows_node("10.0.0.1"));
    assert!(!p.allows_node("10.0.0.2"));
}
