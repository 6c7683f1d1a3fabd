//! Error types for the merge pipeline.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("input directory {0:?} does not exist or is not a directory")]
    MissingInputDir(PathBuf),
    #[error("no input files ending in {suffix:?} found in {dir:?}")]
    NoInputFiles { dir: PathBuf, suffix: String },
    #[error("malformed record in {path:?} at line {line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("{field} value {value:?} in {path:?} at line {line} contains the locus key delimiter {delimiter:?}")]
    DelimiterInLocusField {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
        delimiter: char,
    },
    #[error("duplicate locus {key:?} for sample {sample:?}")]
    DuplicateLocus { sample: String, key: String },
    #[error("sample {sample:?} found in both {first:?} and {second:?}")]
    DuplicateSample {
        sample: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("locus key {0:?} does not split into CHROM, POS, REF, ALT")]
    MalformedLocusKey(String),
}
