pub mod config;
pub mod error;
pub mod models;
pub mod profile;

pub use error::{RedripError, Result};
