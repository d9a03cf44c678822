//! Tests for domain errors

#[cfg(test)]
mod domain_error_tests;
