use super::*;
use crate::peer_transport::fake::FakePeerTransport;
use supvisors_core::StartingStrategy;
use supvisors_engine::FsmState;

fn new_supervisors() -> (Supervisors, mpsc::Receiver<PeerEvent>) {
    let options = SupervisorsOptions::from_env(vec!["A".into(), "B".into()], "A");
    let (inbound_tx, inbound_rx) = mpsc::channel(32);
    let transport = Arc::new(FakePeerTransport::new());
    (Supervisors::new(options, transport, inbound_tx), inbound_rx)
}

#[test]
fn starts_in_initialization_with_no_master() {
    let (supervisors, _rx) = new_supervisors();
    assert_eq!(supervisors.supvisors_state(), FsmState::Initialization);
    assert_eq!(supervisors.master_identifier(), None);
}

#[test]
fn tick_with_both_nodes_authorized_elects_lexicographic_master() {
    let (mut supervisors, _rx) = new_supervisors();
    supervisors.tick(
        vec![
            PeerEvent::Tick { identifier: "A".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "A".into(), allowed: true },
            PeerEvent::Tick { identifier: "B".into(), when: 0, sequence_counter: 1 },
            PeerEvent::Authorization { peer: "B".into(), allowed: true },
        ],
        0,
    );
    assert_eq!(supervisors.supvisors_state(), FsmState::Deployment);
    assert_eq!(supervisors.master_identifier(), Some("A"));
}

#[test]
fn start_application_before_operation_is_rejected() {
    let (mut supervisors, _rx) = new_supervisors();
    let err = supervisors.start_application(StartingStrategy::Config, "app").unwrap_err();
    assert!(matches!(err, EngineError::BadSupvisorsState(_)));
}

#[test]
fn restart_application_restart_process_and_start_args_before_operation_are_rejected() {
    let (mut supervisors, _rx) = new_supervisors();
    assert!(matches!(
        supervisors.restart_application(StartingStrategy::Config, "app").unwrap_err(),
        EngineError::BadSupvisorsState(_)
    ));
    assert!(matches!(
        supervisors.restart_process(StartingStrategy::Config, "app:p1", None).unwrap_err(),
        EngineError::BadSupvisorsState(_)
    ));
    assert!(matches!(supervisors.start_args("app:p1", None).unwrap_err(), EngineError::BadSupvisorsState(_)));
}

#[tokio::test]
async fn shutdown_returns_without_hanging() {
    let (supervisors, _rx) = new_supervisors();
    supervisors.shutdown(Duration::from_millis(200)).await;
}
