// Public API for integration tests and potential library usage

pub mod api;
pub mod assets;
pub mod catalog;
pub mod game;
pub mod prefetch;
pub mod protocol;
pub mod retry;
pub mod scoring;
pub mod session;
pub mod types;
