//! Implementation of the cohort genotype matrix merge.

pub mod ds;
pub mod input;
pub mod output;

use std::{path::PathBuf, time::Instant};

use thousands::Separable;

use crate::{common, err::MergeError};

use self::{
    ds::{DuplicatePolicy, Matrix},
    input::SampleFile,
    output::Flavour,
};

/// Command line arguments for the merge.
#[derive(Debug, Clone, clap::Args)]
#[group(id = "merge")]
pub struct Args {
    /// Identifier of the run, used as suffix of the output file names.
    pub run_id: String,

    /// Directory with the `*.g.vcf.filtered.csv` files.
    #[arg(long, default_value = "/home/dnanexus/filtered_vcfs/")]
    pub path_input: String,
    /// Directory to write the output files to.
    #[arg(long, default_value = "/home/dnanexus/")]
    pub path_output: String,
    /// Prefix of the output file names.
    #[arg(long, default_value = "UKB_VCFmerge")]
    pub output_prefix: String,
    /// How to handle a locus occurring twice in one sample file.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Reject)]
    pub on_duplicate: DuplicatePolicy,
    /// Write header-only output files if no input file is found.
    #[arg(long, default_value_t = false)]
    pub allow_empty: bool,
}

/// Load all sample files and merge them into one matrix.
///
/// Column `i` of the result corresponds to `sample_files[i]`.
pub fn build_matrix(
    sample_files: &[SampleFile],
    policy: DuplicatePolicy,
) -> Result<Matrix, anyhow::Error> {
    let mut matrix = Matrix::new(sample_files.iter().map(|f| f.sample.clone()).collect());

    for (sample_idx, sample_file) in sample_files.iter().enumerate() {
        let before_loading = Instant::now();
        let calls = input::load_sample(sample_file)?;
        tracing::debug!(
            "sample {}: read {} rows, dropped {} hom. ref. rows in {:?}",
            &calls.sample,
            calls.count_read.separate_with_commas(),
            calls.count_hom_ref.separate_with_commas(),
            before_loading.elapsed()
        );

        for (key, genotype) in calls.calls {
            matrix.insert(sample_idx, key.to_string(), genotype, policy)?;
        }
    }

    Ok(matrix)
}

/// Main entry point for the merge.
pub fn run(args_common: &common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting gcgr-vcfmerge {}", common::worker_version());
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let path_input = PathBuf::from(shellexpand::tilde(&args.path_input).into_owned());
    let path_output = PathBuf::from(shellexpand::tilde(&args.path_output).into_owned());

    tracing::info!("Discovering input files in {:?} ...", &path_input);
    let sample_files = input::discover(&path_input)?;
    if sample_files.is_empty() {
        if args.allow_empty {
            tracing::warn!("no input files found, writing empty output");
        } else {
            return Err(MergeError::NoInputFiles {
                dir: path_input,
                suffix: input::INPUT_SUFFIX.to_string(),
            }
            .into());
        }
    }
    tracing::info!(
        "... found {} input files",
        sample_files.len().separate_with_commas()
    );

    tracing::info!("Merging sample tables ...");
    let before_merge = Instant::now();
    let full = build_matrix(&sample_files, args.on_duplicate)?;
    let reduced = full.reduce();
    tracing::info!(
        "... merged {} loci from {} samples in {:?}",
        full.len().separate_with_commas(),
        full.samples().len().separate_with_commas(),
        before_merge.elapsed()
    );
    common::trace_rss_now();

    let (path_full, path_reduced) =
        output::output_paths(&path_output, &args.output_prefix, &args.run_id);
    tracing::info!("Writing {:?} and {:?} ...", &path_full, &path_reduced);
    let before_writing = Instant::now();
    output::write_matrix_to_path(&path_full, &full, Flavour::Full)?;
    output::write_matrix_to_path(&path_reduced, &reduced, Flavour::Reduced)?;
    tracing::info!("... done writing in {:?}", before_writing.elapsed());
    common::trace_rss_now();

    tracing::info!("All of the merge completed in {:?}", before_anything.elapsed());
    Ok(())
}
