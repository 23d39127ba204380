//! Sample command - prints SMILES drawn from a checkpoint to stdout.

use anyhow::Result;
use clap::Args;
use policy::{Sampler, TokenPolicy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::ux_error::UxError;

#[derive(Args)]
pub struct SampleArgs {
    /// Model checkpoint to sample from
    #[arg(long, value_name = "PATH")]
    pub model: PathBuf,

    /// Number of SMILES to draw
    #[arg(short = 'n', long, default_value_t = 100)]
    pub num: usize,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sequences drawn per batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Omit the log-likelihood column
    #[arg(long)]
    pub smiles_only: bool,
}

pub fn run(args: SampleArgs) -> Result<()> {
    if args.batch_size == 0 {
        return Err(UxError::new("--batch-size must be at least 1").into());
    }
    let model = TokenPolicy::load(&args.model).map_err(|e| {
        UxError::new(format!("Cannot load model '{}'", args.model.display()))
            .why(e.to_string())
            .fix("Pass a checkpoint written by a create_model or transfer_learning run")
    })?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let sampler = Sampler::new(&model, &model);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut remaining = args.num;
    while remaining > 0 {
        let batch = remaining.min(args.batch_size);
        for candidate in sampler.sample(batch, &mut rng) {
            if args.smiles_only {
                writeln!(out, "{}", candidate.smiles)?;
            } else {
                writeln!(out, "{}\t{:.4}", candidate.smiles, candidate.agent_log_likelihood)?;
            }
        }
        remaining -= batch;
    }
    out.flush()?;
    Ok(())
}
