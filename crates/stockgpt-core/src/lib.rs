// UniFFI scaffolding for generating Swift/Kotlin bindings
uniffi::setup_scaffolding!();

pub mod assistant;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod ffi;
pub mod models;
pub mod news;
pub mod secure_storage;
pub mod store;
pub mod tracing_setup;

// Re-export FFI types at crate root for convenience
pub use ffi::{StockGptCore, StockGptError};
