//! Tests for coordinator services and configuration
