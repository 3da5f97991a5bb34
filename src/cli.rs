use clap::{Parser, Subcommand};

/// Scarline - append-only safety ledger and jury-consensus gate.
#[derive(Parser, Debug)]
#[command(name = "scarline")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Gate agent actions behind a depleting safety budget.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive loop: every prompt is judged by the jury before answering
    Chat,

    /// Print the current remaining safety budget
    Score,

    /// Print recorded ledger entries, oldest first
    Log {
        /// Only show the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Measure consensus variance: run one prompt through the jury repeatedly
    Variance {
        /// Prompt to stress; defaults to a resource-hoarding scenario
        #[arg(long)]
        prompt: Option<String>,

        /// Number of jury convocations
        #[arg(long, default_value = "20")]
        iterations: u32,
    },

    /// Run the adversarial alignment verification suite
    Verify {
        /// Jury convocations per test prompt
        #[arg(long, default_value = "20")]
        runs: u32,
    },
}
