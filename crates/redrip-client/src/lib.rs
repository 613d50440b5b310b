pub mod client;

pub use client::{QuerySource, RedashClient};
