use super::*;

#[test]
fn process_rules_default_has_no_allowed_nodes() {
    let rules = ProcessRules::default();
    assert!(rules.nodes.is_empty());
    assert_eq!(rules.starting_failure_strategy, StartingFailureStrategy::Abort);
}

#[test]
fn process_rules_builder_overrides_defaults() {
    let rules = ProcessRules::builder()
        .nodes(vec!["10.0.0.1".to_string()])
        .expected_load(50)
        .required(true)
        .build();
    assert_eq!(rules.nodes, vec!["10.0.0.1".to_string()]);
    assert_eq!(rules.expected_load, 50);
    assert!(rules.required);
}

#[test]
fn application_rules_default_is_managed() {
    assert!(ApplicationRules::default().managed);
}

#[yare::parameterized(
    config = { StartingStrategy::Config },
    less_loaded = { StartingStrategy::LessLoaded },
    most_loaded = { StartingStrategy::MostLoaded },
    local = { StartingStrategy::Local },
)]
fn starting_strategy_roundtrips(strategy: StartingStrategy) {
    let json = serde_json::to_string(&strategy).unwrap();
    let parsed: StartingStrategy = serde_json::from_str(&json).unwrap();
    assert_eq!(strategy, parsed);
}

#[yare::parameterized(
    senicide = { ConciliationStrategy::Senicide },
    infanticide = { ConciliationStrategy::Infanticide },
    user = { ConciliationStrategy::User },
    stop = { ConciliationStrategy::Stop },
    restart = { ConciliationStrategy::Restart },
    running_failure = { ConciliationStrategy::RunningFailure },
)]
fn conciliation_strategy_roundtrips(strategy: ConciliationStrategy) {
    let json = serde_json::to_string(&strategy).unwrap();
    let parsed: ConciliationStrategy = serde_json::from_str(&json).unwrap();
    assert_eq!(strategy, parsed);
}
