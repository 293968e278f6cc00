// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves cross-node conflicts on entering CONCILIATION (§4.6).

use crate::failure_handler::FailureHandler;
use crate::request_sink::RequestSink;
use supvisors_core::{ConciliationStrategy, Context, ProcessStatus};

/// Applies `strategy` to every conflicting [`ProcessStatus`] reported by
/// `ctx.conflicts()`.
pub fn conciliate(strategy: ConciliationStrategy, ctx: &Context, sink: &impl RequestSink, failure_handler: &mut FailureHandler) {
    for process in ctx.conflicts() {
        conciliate_process(strategy, process, ctx, sink, failure_handler);
    }
}

fn conciliate_process(
    strategy: ConciliationStrategy,
    process: &ProcessStatus,
    ctx: &Context,
    sink: &impl RequestSink,
    failure_handler: &mut FailureHandler,
) {
    use ConciliationStrategy::*;
    match strategy {
        User => {}
        Senicide => stop_all_but(process, sink, Keep::Oldest),
        Infanticide => stop_all_but(process, sink, Keep::Youngest),
        Stop => stop_all(process, sink),
        Restart => {
            stop_all(process, sink);
            let application_name = process.namespec.split(':').next().unwrap_or(&process.namespec);
            failure_handler.add_restart_process(application_name, &process.namespec);
        }
        RunningFailure => {
            stop_all(process, sink);
            if let Some(application) = ctx.application(process.namespec.split(':').next().unwrap_or(&process.namespec)) {
                failure_handler.handle_running_failure(application, process);
            }
        }
    }
}

enum Keep {
    /// SENICIDE: keep the instance with the largest uptime.
    Oldest,
    /// INFANTICIDE: keep the instance with the smallest uptime.
    Youngest,
}

/// Uptime is local-monotonic per node (§4.6: nodes are not assumed
/// clock-synchronized), so "oldest"/"youngest" is compared within this
/// single process's running identifiers, never across processes.
fn stop_all_but(process: &ProcessStatus, sink: &impl RequestSink, keep: Keep) {
    let mut candidates: Vec<(&str, u64)> = process
        .running_identifiers()
        .into_iter()
        .filter_map(|id| process.info.get(id).map(|info| (id, info.uptime)))
        .collect();
    if candidates.is_empty() {
        return;
    }
    candidates.sort_by_key(|(_, uptime)| *uptime);
    let keep_id = match keep {
        Keep::Oldest => candidates.last().map(|(id, _)| *id),
        Keep::Youngest => candidates.first().map(|(id, _)| *id),
    };
    for (id, _) in candidates {
        if Some(id) != keep_id {
            sink.push_stop_process(id, &process.namespec);
        }
    }
}

fn stop_all(process: &ProcessStatus, sink: &impl RequestSink) {
    for identifier in process.running_identifiers() {
        sink.push_stop_process(identifier, &process.namespec);
    }
}

#[cfg(test)]
#[path = "conciliation_tests.rs"]
mod tests;
