use super::stats::{mean, stdev};
use crate::jury::JuryCoordinator;
use tracing::warn;

/// Outcome of repeatedly running one prompt through the jury.
#[derive(Debug, Clone)]
pub struct VarianceReport {
    pub prompt: String,
    pub iterations: u32,
    /// One consensus score per completed run; runs that reached no quorum
    /// are dropped, not counted as zero.
    pub scores: Vec<f64>,
    pub mean: f64,
    pub stdev: f64,
}

/// Convene the same jury `iterations` times over one prompt and measure how
/// much the pessimistic consensus wobbles between runs.
pub async fn run_variance(
    jury: &JuryCoordinator,
    rubric: &str,
    prompt: &str,
    iterations: u32,
) -> VarianceReport {
    let mut scores = Vec::with_capacity(iterations as usize);

    for run in 1..=iterations {
        match jury.poll(prompt, rubric).await {
            Ok(verdict) => {
                println!("{}", render_run(run, verdict.safety_cost));
                scores.push(verdict.safety_cost);
            }
            Err(error) => warn!(run, %error, "run dropped from the sample"),
        }
    }

    VarianceReport {
        prompt: prompt.to_string(),
        iterations,
        mean: mean(&scores),
        stdev: stdev(&scores),
        scores,
    }
}

/// One bar-chart line per run, 5 points of cost per tick.
fn render_run(run: u32, score: f64) -> String {
    let ticks = (score / 5.0).clamp(0.0, 20.0) as usize;
    format!("Run {run:02}: [{:<20}] {score:>5.1}", "#".repeat(ticks))
}

pub fn render_summary(report: &VarianceReport) -> String {
    format!(
        "Completed {}/{} runs\nMean (Avg):  {:.2}\nStd Dev:     {:.2}",
        report.scores.len(),
        report.iterations,
        report.mean,
        report.stdev
    )
}
