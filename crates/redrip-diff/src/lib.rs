pub mod diff;
pub mod text;

pub use diff::{compare, compare_all, DiffResult, DiffStatus, DiffSummary};
