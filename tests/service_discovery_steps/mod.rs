//! Step definitions for service discovery scenarios.

mod given;
mod then;
mod when;
pub mod world;
