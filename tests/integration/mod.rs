//! Integration tests module
//!
//! This module organizes all integration tests for the sonos-grouper application.

pub mod client_http_test;
pub mod live_api_test;
