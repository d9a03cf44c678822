//! Tests for refresh token repositories
