//! Unit tests for discovery orchestration.
//!
//! Adapter-specific behaviour is tested beside each adapter; these tests
//! drive the coordinator and configurator through a scripted adapter.

mod configurator_tests;
mod support;
