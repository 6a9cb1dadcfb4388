use std::path::PathBuf;

use anyhow::Context;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use snakevo_engine::{Direction, FoodPlan, VISION_LEN};
use snakevo_evaluator::session_evaluator::{
    DefaultSessionEvaluator, EpisodeStats, EvaluateEpisodeStats as _, SessionEvaluator as _,
};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the model file (JSON format)
    model_path: PathBuf,
    /// Number of episodes to play
    #[arg(long, default_value_t = 1)]
    episodes: usize,
    /// Seed of the food plan (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Training configuration providing the game rules and fitness weights
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path for the evaluation report
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct EpisodeReport {
    episode: usize,
    fitness: f64,
    stats: EpisodeStats,
}

#[derive(Debug, Clone, Serialize)]
struct EvaluationReport {
    model: String,
    seed: u64,
    mean_fitness: f64,
    episodes: Vec<EpisodeReport>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        model_path,
        episodes,
        seed,
        config,
        output,
    } = arg;
    anyhow::ensure!(*episodes > 0, "At least one episode must be played");

    let config = util::read_training_config(config.as_deref())?;
    let model = util::read_model_file(model_path)?;
    let network = &model.network;
    anyhow::ensure!(
        network.input_size() == VISION_LEN && network.output_size() == Direction::LEN,
        "Model {} has layer sizes {:?}; a controller needs {VISION_LEN} inputs and {} outputs",
        model_path.display(),
        network.layer_sizes(),
        Direction::LEN,
    );

    let evaluator = DefaultSessionEvaluator::new(config.game, config.fitness)
        .context("Invalid game configuration")?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    let plan = FoodPlan::generate(
        &mut rng,
        config.game.grid_size,
        config.genetic.food_sequence_len,
        *episodes,
        config.game.spawn_position(),
    );

    eprintln!("Evaluating {} ({} episodes, seed {seed}):", model.name, plan.episodes());
    let reports = (0..plan.episodes())
        .map(|episode| -> anyhow::Result<EpisodeReport> {
            let stats = evaluator
                .play_episode(network, plan.queue_for_episode(episode))
                .with_context(|| format!("Failed to play episode {episode}"))?;
            let fitness = evaluator.evaluator().evaluate_episode_stats(&stats);
            eprintln!(
                "  {episode:3}: score {:3}, lifetime {:4}, {} => {fitness:.3}",
                stats.score, stats.lifetime, stats.end_state
            );
            Ok(EpisodeReport {
                episode,
                fitness,
                stats,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    #[expect(clippy::cast_precision_loss)]
    let mean_fitness = reports.iter().map(|r| r.fitness).sum::<f64>() / reports.len() as f64;
    eprintln!("  Mean fitness: {mean_fitness:.3}");

    let report = EvaluationReport {
        model: model.name.clone(),
        seed,
        mean_fitness,
        episodes: reports,
    };
    Output::save_json(&report, output.clone())
}
