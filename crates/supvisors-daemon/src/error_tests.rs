use super::*;

#[test]
fn engine_error_maps_to_matching_fault_code() {
    let err = EngineError::BadSupvisorsState("initialization".into());
    let fault: RpcFault = err.into();
    assert_eq!(fault.code, FaultCode::BadSupvisorsState);
    assert!(fault.message.contains("initialization"));
}

#[test]
fn already_started_maps_to_already_started() {
    let err = EngineError::AlreadyStarted("app:p1".into());
    assert_eq!(FaultCode::from(&err), FaultCode::AlreadyStarted);
}
