//! Merge per-sample genotype call tables into cohort matrices.

pub mod common;
pub mod err;
pub mod merge;

use clap::Parser;
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Merge per-sample genotype call tables",
    long_about = "Merge the per-sample `*.g.vcf.filtered.csv` genotype call tables into a \
                  cohort matrix with full genotype values and one with genotype calls only"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// Arguments of the merge
    #[command(flatten)]
    args: merge::Args,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(common::level_filter(&cli.common.verbose))
        .compact()
        .finish();

    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || merge::run(&cli.common, &cli.args))?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
