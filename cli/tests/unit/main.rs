//! Unit tests for the agent metadata CLI
//!
//! These tests use mocked ports and run fast without external I/O.

mod architecture;
mod index_service;
mod property_tests;
mod upload_service;
