use std::path::PathBuf;

use snakevo_training::params::TrainingConfig;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PrintConfigArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PrintConfigArg) -> anyhow::Result<()> {
    Output::save_json(&TrainingConfig::canonical(), arg.output.clone())
}
