//! Integration tests for nightwatch-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! needs no remote host.

mod cli_tests;
mod inventory;
