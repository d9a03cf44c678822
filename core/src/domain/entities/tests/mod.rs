//! Tests for domain entities

#[cfg(test)]
mod claim_tests;
