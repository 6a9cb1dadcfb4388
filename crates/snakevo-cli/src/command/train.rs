use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use snakevo_evaluator::{network::NeuralNetwork, session_evaluator::DefaultSessionEvaluator};
use snakevo_training::genetic::{GenerationReport, GeneticAlgorithm};
use tracing::info;

use crate::{
    model::controller_model::ControllerModel,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (canonical configuration if omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed of the genetic algorithm, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Number of generations to run, overriding the configuration
    #[arg(long)]
    generations: Option<usize>,
    /// Population file to continue training from
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Save the population after the last generation to this file
    #[arg(long)]
    save_population: Option<PathBuf>,
    /// Output file path for the trained model
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        seed,
        generations,
        resume,
        save_population,
        output,
    } = arg;

    let mut config = util::read_training_config(config.as_deref())?;
    if let Some(seed) = seed {
        config.genetic.seed = Some(*seed);
    }
    if let Some(generations) = generations {
        config.genetic.max_generations = *generations;
    }
    let max_generations = config.genetic.max_generations;
    anyhow::ensure!(max_generations > 0, "At least one generation must be run");

    let evaluator = DefaultSessionEvaluator::new(config.game, config.fitness)
        .context("Invalid game configuration")?;
    let mut ga = GeneticAlgorithm::new(config.genetic, evaluator)
        .context("Failed to initialize the genetic algorithm")?;

    if let Some(path) = resume {
        let snapshot = util::read_population_file(path)?;
        ga.restore(snapshot)
            .with_context(|| format!("Failed to resume population from {}", path.display()))?;
        info!(generation = ga.generation(), path = %path.display(), "resumed population");
    }

    let mut champion: Option<(NeuralNetwork, GenerationReport)> = None;
    for _ in 0..max_generations {
        let generation = ga.generation();
        let report = GenerationReport::from_record(generation, ga.evaluate_generation());
        print_report(&report);
        info!(
            generation,
            best = report.best_fitness,
            mean = report.summary.mean,
            failures = report.failures,
            "generation completed"
        );
        if let Some((network, _)) = ga.best_individual() {
            champion = Some((network.clone(), report));
        }
        ga.advance_generation()?;
    }

    eprintln!("Training completed after {max_generations} generations.");

    if let Some(path) = save_population {
        Output::save_json(&ga.snapshot(), Some(path.clone()))?;
        eprintln!("Population saved to {}", path.display());
    }

    let (network, report) = champion.context("No generation was evaluated")?;
    let model = ControllerModel {
        name: format!("snakevo-seed-{}", ga.seed()),
        trained_at: Utc::now(),
        generation: report.generation,
        final_fitness: report.best_fitness,
        network,
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Layer sizes: {:?}", model.network.layer_sizes());

    Ok(())
}

fn print_report(report: &GenerationReport) {
    eprintln!("Generation #{}:", report.generation);
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:  {:.3}", report.summary.min);
    eprintln!("    Max:  {:.3}", report.summary.max);
    eprintln!("    Mean: {:.3}", report.summary.mean);
    eprintln!("  Best individual: #{}", report.best_index);
    if report.failures > 0 {
        eprintln!("  Failed evaluations: {}", report.failures);
    }
    if report.non_positive_sum {
        eprintln!("  Warning: raw fitness sum was not positive");
    }
}
