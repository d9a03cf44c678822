//! Unit tests for claims and claim sets

use crate::domain::entities::claim::{Claim, ClaimSet, SUBJECT_CLAIM};

#[test]
fn test_duplicate_claim_types_overwrite() {
    let set: ClaimSet = vec![
        Claim::new("role", "reader"),
        Claim::new("tenant", "t-1"),
        Claim::new("role", "admin"),
    ]
    .into_iter()
    .collect();

    assert_eq!(set.len(), 2);
    assert_eq!(set.get("role"), Some("admin"));
    assert_eq!(set.get("tenant"), Some("t-1"));
}

#[test]
fn test_subject_lookup() {
    let set = ClaimSet::new().with("role", "reader");
    assert_eq!(set.subject(), None);

    let set = set.with(SUBJECT_CLAIM, "user-42");
    assert_eq!(set.subject(), Some("user-42"));
}

#[test]
fn test_reserved_claim_detection() {
    assert!(Claim::new("exp", "1").is_reserved());
    assert!(!Claim::new("permissions", "abc").is_reserved());

    let set = ClaimSet::new().with("tenant", "t").with("jti", "x");
    assert_eq!(set.reserved_claim(), Some("jti"));
    assert_eq!(ClaimSet::new().with("tenant", "t").reserved_claim(), None);
}

#[test]
fn test_superset() {
    let granted = ClaimSet::new().with("role", "admin");
    let full = granted.clone().with(SUBJECT_CLAIM, "u");
    assert!(full.is_superset_of(&granted));
    assert!(!granted.is_superset_of(&full));
}

#[test]
fn test_claim_set_serializes_as_flat_object() {
    let set = ClaimSet::new().with("b", "2").with("a", "1");
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"{"a":"1","b":"2"}"#);
}

#[test]
fn test_into_iter_yields_claims_in_type_order() {
    let set = ClaimSet::new().with("z", "last").with("a", "first");
    let claims: Vec<Claim> = set.into_iter().collect();
    assert_eq!(claims[0], Claim::new("a", "first"));
    assert_eq!(claims[1], Claim::new("z", "last"));
}
