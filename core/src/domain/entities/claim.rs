//! Claims embedded in access tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Claim type holding the subject's user identifier
pub const SUBJECT_CLAIM: &str = "sub";

/// Registered token fields that a claim set may not shadow
pub const RESERVED_CLAIMS: [&str; 6] = ["iss", "aud", "exp", "nbf", "iat", "jti"];

/// A typed key-value fact about the subject
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Whether this claim would collide with a registered token field
    pub fn is_reserved(&self) -> bool {
        RESERVED_CLAIMS.contains(&self.claim_type.as_str())
    }
}

/// Set of claims keyed by claim type
///
/// Claim types are unique; inserting an existing type overwrites its value.
/// Serializes as a flat JSON object so it can be merged into a token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, String>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a claim, returning the previous value for that type
    pub fn insert(&mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(claim_type.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(claim_type, value);
        self
    }

    pub fn get(&self, claim_type: &str) -> Option<&str> {
        self.0.get(claim_type).map(String::as_str)
    }

    pub fn contains(&self, claim_type: &str) -> bool {
        self.0.contains_key(claim_type)
    }

    pub fn remove(&mut self, claim_type: &str) -> Option<String> {
        self.0.remove(claim_type)
    }

    /// The subject's user identifier, if present
    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_CLAIM)
    }

    /// First claim type that collides with a registered token field
    pub fn reserved_claim(&self) -> Option<&str> {
        RESERVED_CLAIMS
            .iter()
            .copied()
            .find(|name| self.0.contains_key(*name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Claims as owned values, ordered by type
    pub fn to_claims(&self) -> Vec<Claim> {
        self.iter().map(|(t, v)| Claim::new(t, v)).collect()
    }

    /// True when every claim in `other` is present here with the same value
    pub fn is_superset_of(&self, other: &ClaimSet) -> bool {
        other.iter().all(|(t, v)| self.get(t) == Some(v))
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        let mut set = ClaimSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ClaimSet(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Extend<Claim> for ClaimSet {
    fn extend<I: IntoIterator<Item = Claim>>(&mut self, iter: I) {
        for claim in iter {
            self.0.insert(claim.claim_type, claim.value);
        }
    }
}

impl IntoIterator for ClaimSet {
    type Item = Claim;
    type IntoIter = std::iter::Map<
        std::collections::btree_map::IntoIter<String, String>,
        fn((String, String)) -> Claim,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .into_iter()
            .map(into_claim as fn((String, String)) -> Claim)
    }
}

fn into_claim((claim_type, value): (String, String)) -> Claim {
    Claim { claim_type, value }
}
