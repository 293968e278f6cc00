// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure functions selecting a node for a new process (§4.2).

use crate::address_mapper::AddressMapper;
use crate::rules::StartingStrategy;
use std::collections::HashMap;

/// A node is a placement candidate for `expected_load` iff it is RUNNING
/// and `load + expected_load < 100`.
fn accepts_load(load: u32, expected_load: u32) -> bool {
    load + expected_load < 100
}

/// Choose a node for a new process instance.
///
/// `allowed_nodes` is the process's own `rules.nodes` restriction.
/// `running` reports which configured identifiers are currently RUNNING.
/// `loads` is each RUNNING node's current load (§3 inv. 3).
///
/// Ties are broken by configuration order (`AddressMapper::node_identifiers`).
pub fn choose_node(
    strategy: StartingStrategy,
    mapper: &AddressMapper,
    allowed_nodes: &[String],
    running: impl Fn(&str) -> bool,
    loads: &HashMap<String, u32>,
    expected_load: u32,
) -> Option<String> {
    let candidates: Vec<&str> = mapper
        .node_identifiers()
        .iter()
        .map(String::as_str)
        .filter(|id| allowed_nodes.iter().any(|n| n == id))
        .filter(|id| running(id))
        .collect();

    match strategy {
        StartingStrategy::Config => candidates
            .into_iter()
            .find(|id| accepts_load(loads.get(*id).copied().unwrap_or(0), expected_load))
            .map(str::to_string),
        StartingStrategy::LessLoaded => pick_extreme(candidates, loads, expected_load, false),
        StartingStrategy::MostLoaded => pick_extreme(candidates, loads, expected_load, true),
        StartingStrategy::Local => {
            let local = mapper.local_identifier();
            candidates
                .into_iter()
                .find(|id| *id == local)
                .filter(|id| accepts_load(loads.get(*id).copied().unwrap_or(0), expected_load))
                .map(str::to_string)
        }
    }
}

/// Scan `candidates` in configuration order, keeping the first one
/// reaching the running `want_max`/`want_min` extreme among those that
/// accept the load. First-encountered wins ties, which keeps both
/// LESS_LOADED and MOST_LOADED tie-broken by configuration order.
fn pick_extreme(
    candidates: Vec<&str>,
    loads: &HashMap<String, u32>,
    expected_load: u32,
    want_max: bool,
) -> Option<String> {
    let mut best: Option<(&str, u32)> = None;
    for id in candidates {
        let load = loads.get(id).copied().unwrap_or(0);
        if !accepts_load(load, expected_load) {
            continue;
        }
        best = match best {
            None => Some((id, load)),
            Some((_, best_load)) if want_max && load > best_load => Some((id, load)),
            Some((_, best_load)) if !want_max && load < best_load => Some((id, load)),
            other => other,
        };
    }
    best.map(|(id, _)| id.to_string())
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
