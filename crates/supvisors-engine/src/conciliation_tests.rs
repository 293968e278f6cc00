use super::*;
use crate::test_support::RecordingSink;
use supvisors_core::test_support::two_node_context;
use supvisors_core::{ProcessReport, ProcessRules, ProcessState, RemoteProcessInfo};

fn conflicting_ctx() -> Context {
    let mut ctx = two_node_context();
    ctx.register_process("app:p1", Default::default(), ProcessRules::default());
    ctx.load_process_info(
        "A",
        vec![ProcessReport { namespec: "app:p1".into(), info: RemoteProcessInfo { state: ProcessState::Running, uptime: 100, expected_exit: false, pid: Some(1) } }],
    );
    ctx.load_process_info(
        "B",
        vec![ProcessReport { namespec: "app:p1".into(), info: RemoteProcessInfo { state: ProcessState::Running, uptime: 5, expected_exit: false, pid: Some(2) } }],
    );
    ctx
}

#[test]
fn user_strategy_is_a_no_op() {
    let ctx = conflicting_ctx();
    let sink = RecordingSink::new();
    let mut handler = FailureHandler::new();
    conciliate(ConciliationStrategy::User, &ctx, &sink, &mut handler);
    assert!(sink.requests().is_empty());
}

#[test]
fn stop_strategy_stops_every_running_identifier() {
    let ctx = conflicting_ctx();
    let sink = RecordingSink::new();
    let mut handler = FailureHandler::new();
    conciliate(ConciliationStrategy::Stop, &ctx, &sink, &mut handler);
    assert_eq!(sink.requests().len(), 2);
}

#[test]
fn senicide_keeps_the_largest_uptime() {
    let ctx = conflicting_ctx();
    let sink = RecordingSink::new();
    let mut handler = FailureHandler::new();
    conciliate(ConciliationStrategy::Senicide, &ctx, &sink, &mut handler);
    let stopped: Vec<_> = sink
        .requests()
        .into_iter()
        .map(|r| match r {
            crate::test_support::RecordedRequest::StopProcess { identifier, .. } => identifier,
            _ => panic!("unexpected request"),
        })
        .collect();
    assert_eq!(stopped, vec!["B".to_string()], "A has the larger uptime and must be kept");
}

#[test]
fn infanticide_keeps_the_smallest_uptime() {
    let ctx = conflicting_ctx();
    let sink = RecordingSink::new();
    let mut handler = FailureHandler::new();
    conciliate(ConciliationStrategy::Infanticide, &ctx, &sink, &mut handler);
    let stopped: Vec<_> = sink
        .requests()
        .into_iter()
        .map(|r| match r {
            crate::test_support::RecordedRequest::StopProcess { identifier, .. } => identifier,
            _ => panic!("unexpected request"),
        })
        .collect();
    assert_eq!(stopped, vec!["A".to_string()], "B has the smaller uptime and must be kept");
}

#[test]
fn restart_strategy_stops_all_and_schedules_restart_process() {
    let ctx = conflicting_ctx();
    let sink = RecordingSink::new();
    let mut handler = FailureHandler::new();
    conciliate(ConciliationStrategy::Restart, &ctx, &sink, &mut handler);
    assert_eq!(sink.requests().len(), 2);
}
