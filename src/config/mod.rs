pub mod schema;

pub use schema::{AssessorConfig, BudgetConfig, Config, JuryConfig, LedgerConfig};
