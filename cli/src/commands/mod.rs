pub mod run;
pub mod sample;
pub mod score;
pub mod validate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "molforge",
    author,
    version,
    about = "molforge - reinforcement learning for de novo molecular design",
    long_about = "Trains a SMILES generator towards a scoring function.\n\nEvery job is described \
                  by one configuration document (JSON, YAML or TOML); its run_type selects \
                  reinforcement learning, sampling, scoring, transfer learning, model creation \
                  or validation."
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the job described by a configuration file")]
    Run(run::RunArgs),

    #[command(about = "Check a configuration file without running it")]
    Validate(validate::ValidateArgs),

    #[command(about = "Sample SMILES from a model checkpoint")]
    Sample(sample::SampleArgs),

    #[command(about = "Score SMILES with a configured scoring function")]
    Score(score::ScoreArgs),
}
