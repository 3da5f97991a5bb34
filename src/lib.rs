#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod assessor;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod jury;
pub mod ledger;
pub mod policy;
pub mod rubric;

pub use config::Config;
pub use error::{Result, ScarlineError};
