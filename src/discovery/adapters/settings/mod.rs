//! Settings source adapters.

mod environment;
mod json_file;
mod layered;
mod memory;

pub use environment::ProcessEnvironment;
pub use json_file::JsonFileSettings;
pub use layered::LayeredSettings;
pub use memory::InMemorySettings;
