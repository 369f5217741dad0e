pub mod sign;

pub use sign::{RunSummary, SignWorkflow};
