use super::assignment::{self, Trial};
use super::{scoring, util, SchedError, Scheduler, SearchOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::time::Instant;

/// Avancement publié après chaque lot d'essais.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub trials_run: usize,
    pub total_trials: usize,
    pub best_score: f64,
    pub best_penalty: u32,
}

pub(super) struct Best {
    pub trial: Trial,
    pub score: f64,
    pub trials_run: usize,
}

struct Candidate {
    index: usize,
    score: f64,
    trial: Trial,
}

/// Plus petit score ; à égalité le plus petit indice, pour que le résultat
/// ne dépende pas du nombre de threads.
fn better(a: Candidate, b: Candidate) -> Candidate {
    match a.score.total_cmp(&b.score).then(a.index.cmp(&b.index)) {
        Ordering::Greater => b,
        _ => a,
    }
}

pub(super) fn seeded_trial(scheduler: &Scheduler, seed: u64) -> Trial {
    let mut rng = StdRng::seed_from_u64(seed);
    assignment::run_trial(scheduler, &mut rng)
}

fn evaluate(scheduler: &Scheduler, base_seed: u64, index: usize) -> Candidate {
    let trial = seeded_trial(scheduler, util::trial_seed(base_seed, index as u64));
    let score = scoring::score_trial(scheduler, &trial);
    Candidate { index, score, trial }
}

pub(super) fn search<F>(
    scheduler: &Scheduler,
    opts: SearchOptions,
    mut on_batch: F,
) -> Result<Best, SchedError>
where
    F: FnMut(&Progress) -> ControlFlow<()>,
{
    if opts.iterations == 0 {
        return Err(SchedError::InvalidSearch("iterations must be > 0"));
    }
    let batch_size = opts.batch_size.max(1);
    let base_seed = opts.seed.unwrap_or_else(rand::random);
    let started = Instant::now();

    let mut best: Option<Candidate> = None;
    let mut done = 0usize;

    while done < opts.iterations {
        let end = (done + batch_size).min(opts.iterations);
        let batch = if opts.parallel {
            (done..end)
                .into_par_iter()
                .map(|i| evaluate(scheduler, base_seed, i))
                .reduce_with(better)
        } else {
            (done..end)
                .map(|i| evaluate(scheduler, base_seed, i))
                .reduce(better)
        };
        done = end;

        best = match (best, batch) {
            (Some(a), Some(b)) => Some(better(a, b)),
            (a, b) => a.or(b),
        };

        let Some(current) = best.as_ref() else {
            continue;
        };
        tracing::debug!(
            trials = done,
            best_score = current.score,
            penalty = current.trial.penalty,
            "batch done"
        );

        let progress = Progress {
            trials_run: done,
            total_trials: opts.iterations,
            best_score: current.score,
            best_penalty: current.trial.penalty,
        };
        if on_batch(&progress).is_break() {
            tracing::warn!(trials = done, "search cancelled");
            break;
        }
        if let Some(budget) = opts.time_budget {
            if done < opts.iterations && started.elapsed() >= budget {
                tracing::warn!(trials = done, ?budget, "search time budget exhausted");
                break;
            }
        }
    }

    let Some(winner) = best else {
        return Err(SchedError::InvalidSearch("no trial completed"));
    };
    tracing::info!(
        trials = done,
        best_score = winner.score,
        penalty = winner.trial.penalty,
        "search finished"
    );
    Ok(Best {
        trial: winner.trial,
        score: winner.score,
        trials_run: done,
    })
}
