//! Integration tests module
//!
//! This module organizes all integration tests for the r-vidplay application.

// Import individual test modules
pub mod config_test;
pub mod player_test;
pub mod subtitle_flow_test;
