use super::*;

#[test]
fn new_inserts_local_if_missing() {
    let mapper = AddressMapper::new(vec!["10.0.0.2".into(), "10.0.0.3".into()], "10.0.0.1");
    assert_eq!(mapper.node_identifiers(), &["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    assert_eq!(mapper.local_identifier(), "10.0.0.1");
}

#[test]
fn new_does_not_duplicate_local() {
    let mapper = AddressMapper::new(vec!["10.0.0.1".into(), "10.0.0.2".into()], "10.0.0.1");
    assert_eq!(mapper.node_identifiers(), &["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn is_configured_and_is_local() {
    let mapper = AddressMapper::new(vec!["10.0.0.1".into(), "10.0.0.2".into()], "10.0.0.1");
    assert!(mapper.is_configured("10.0.0.2"));
    assert!(!mapper.is_configured("10.0.0.9"));
    assert!(mapper.is_local("10.0.0.1"));
    assert!(!mapper.is_local("10.0.0.2"));
}
