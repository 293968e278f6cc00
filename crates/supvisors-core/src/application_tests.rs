use super::*;

#[test]
fn derive_state_priority_stopping_beats_starting_beats_running() {
    assert_eq!(
        derive_state([ProcessState::Running, ProcessState::Stopping].iter()),
        ApplicationState::Stopping
    );
    assert_eq!(
        derive_state([ProcessState::Running, ProcessState::Starting].iter()),
        ApplicationState::Starting
    );
    assert_eq!(derive_state([ProcessState::Running].iter()), ApplicationState::Running);
    assert_eq!(derive_state([ProcessState::Stopped].iter()), ApplicationState::Stopped);
    assert_eq!(derive_state(std::iter::empty()), ApplicationState::Stopped);
}

#[test]
fn major_failure_when_required_process_stopped_while_running() {
    let required = ProcessRules::builder().required(true).build();
    let optional = ProcessRules::builder().required(false).build();
    let processes =
        vec![(ProcessState::Stopped, required.clone()), (ProcessState::Running, optional.clone())];
    let (major, minor) = derive_failures(
        ApplicationState::Running,
        processes.iter().map(|(s, r)| (s, r)),
    );
    assert!(major);
    assert!(!minor);
}

#[test]
fn minor_failure_when_optional_process_crashed_while_running() {
    let optional = ProcessRules::builder().required(false).build();
    let processes = vec![(ProcessState::Fatal, optional.clone()), (ProcessState::Running, optional)];
    let (major, minor) = derive_failures(
        ApplicationState::Running,
        processes.iter().map(|(s, r)| (s, r)),
    );
    assert!(!major);
    assert!(minor);
}

#[test]
fn no_failures_when_application_not_running() {
    let required = ProcessRules::builder().required(true).build();
    let processes = vec![(ProcessState::Stopped, required)];
    let (major, minor) = derive_failures(
        ApplicationState::Stopped,
        processes.iter().map(|(s, r)| (s, r)),
    );
    assert!(!major);
    assert!(!minor);
}

#[test]
fn add_process_populates_sequence_maps_in_order() {
    let mut app = ApplicationStatus::new("myapp", ApplicationRules::default());
    let q1 = ProcessRules::builder().start_sequence(0).build();
    let q2 = ProcessRules::builder().start_sequence(1).build();
    app.add_process("myapp:q1", &q1);
    app.add_process("myapp:q2", &q2);
    assert_eq!(app.process_namespecs, vec!["myapp:q1", "myapp:q2"]);
    assert_eq!(app.start_sequence.get(&0).unwrap(), &vec!["myapp:q1".to_string()]);
    assert_eq!(app.start_sequence.get(&1).unwrap(), &vec!["myapp:q2".to_string()]);
    assert_eq!(app.start_sequence.keys().collect::<Vec<_>>(), vec![&0, &1], "q1 (seq 0) orders before q2 (seq 1)");
}
