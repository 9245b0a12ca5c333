//! Tests for generator services
