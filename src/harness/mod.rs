pub mod stats;
pub mod variance;
pub mod verify;

pub use variance::{VarianceReport, run_variance};
pub use verify::{PromptReport, VerifyReport, default_verification_suite, run_verification};
