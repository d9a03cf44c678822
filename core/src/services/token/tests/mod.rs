//! Tests for token services

#[cfg(test)]
mod cleanup_tests;
