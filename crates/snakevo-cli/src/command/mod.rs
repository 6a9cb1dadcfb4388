use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, print_config::PrintConfigArg, train::TrainArg};

mod evaluate;
mod print_config;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve snake controllers using the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play a saved model headlessly and report its fitness
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Print the canonical training configuration
    PrintConfig(#[clap(flatten)] PrintConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::PrintConfig(arg) => print_config::run(&arg)?,
    }
    Ok(())
}
