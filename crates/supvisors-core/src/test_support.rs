// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for other crates' tests, gated behind `test-support`.

use crate::address_mapper::AddressMapper;
use crate::context::Context;
use std::sync::Arc;

/// A two-node Context (`"A"` local, `"B"` remote) with no registered
/// processes, handy as a starting point for Starter/Stopper/FSM tests.
pub fn two_node_context() -> Context {
    let mapper = Arc::new(AddressMapper::new(vec!["A".into(), "B".into()], "A"));
    Context::new(mapper)
}

/// Bring a node to RUNNING by ticking then authorizing it.
pub fn bring_node_running(ctx: &mut Context, identifier: &str, now: u64) {
    ctx.load_node_event(identifier, now, now, 1);
    ctx.authorize_node(identifier);
}
