use crate::assessor::OllamaAssessor;
use crate::config::Config;
use crate::error::Result;
use crate::jury::JuryCoordinator;
use crate::ledger::{JsonlScoreStore, RetryPolicy, ScoreStore};
use crate::policy::{Decision, PolicyEngine};
use crate::rubric::DEFAULT_RUBRIC;
use console::style;
use dialoguer::Input;
use std::sync::Arc;

/// Wire the full gate together from config: store, assessor, jury, policy.
pub fn build_engine(config: &Config) -> (PolicyEngine, Arc<OllamaAssessor>) {
    let store = Arc::new(
        JsonlScoreStore::new(config.ledger_path(), config.budget.initial_budget)
            .with_retry_policy(RetryPolicy {
                max_attempts: config.ledger.max_write_retries,
                delay: config.ledger.write_retry_delay(),
            }),
    );
    let assessor = Arc::new(OllamaAssessor::new(&config.assessor));
    let jury = JuryCoordinator::new(
        assessor.clone(),
        config.jury.panel_size,
        config.jury.vote_timeout(),
    );
    let engine = PolicyEngine::new(store, jury, DEFAULT_RUBRIC, &config.budget);
    (engine, assessor)
}

pub fn build_store(config: &Config) -> Arc<dyn ScoreStore> {
    Arc::new(JsonlScoreStore::new(
        config.ledger_path(),
        config.budget.initial_budget,
    ))
}

/// Interactive conscience loop: every prompt is judged before it is answered.
pub async fn run(config: &Config) -> Result<()> {
    let (mut engine, assessor) = build_engine(config);

    println!(
        "{}",
        style("--- SCARLINE CONSCIENCE GATE ONLINE ---").bold()
    );
    println!(
        "Model: {} | Jury size: {}",
        assessor.model(),
        config.jury.panel_size
    );
    println!("Ledger: {}", config.ledger_path().display());

    loop {
        let score = engine.current_score()?;
        println!(
            "\n[{}] {:.2}/{:.0}",
            style("SAFETY BUDGET").cyan(),
            score,
            config.budget.initial_budget
        );

        let input: String = Input::new()
            .with_prompt("you")
            .interact_text()
            .map_err(|e| anyhow::anyhow!("input error: {e}"))?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        println!("...convening jury of {}...", config.jury.panel_size);
        let outcome = engine.evaluate(trimmed).await?;

        match outcome.decision {
            Decision::Permitted => match assessor.reply(trimmed).await {
                Ok(reply) => println!("{} {reply}", style("ai:").green()),
                Err(error) => println!("{} {error}", style("error:").red()),
            },
            Decision::Refused { cost } => {
                println!(
                    "{} my safety constraints prevent me from fulfilling this request. (cost: {cost})",
                    style("[refusal]").yellow()
                );
            }
            Decision::Retryable => {
                println!("jury failed to return a verdict, ask again");
            }
            Decision::Halted => {
                println!(
                    "{}",
                    style("!!! SYSTEM HALT: safety budget exhausted. !!!").red().bold()
                );
                break;
            }
        }
    }

    Ok(())
}
