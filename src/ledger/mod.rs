pub mod store;

pub use store::{CostEntry, JsonlScoreStore, RetryPolicy, ScoreStore};
