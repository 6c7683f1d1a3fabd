//! Discovery and loading of the per-sample genotype call tables.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{de::IgnoredAny, Deserialize};

use super::ds::{is_hom_ref, LocusKey, KEY_DELIMITER};
use crate::{common::io::open_read_maybe_gz, err::MergeError};

/// Suffix of the per-sample input files, optionally followed by `.gz`.
pub const INPUT_SUFFIX: &str = ".g.vcf.filtered.csv";

/// Number of fields in each input row.
pub const NUM_FIELDS: usize = 10;

/// One per-sample input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    /// sample identifier, file name up to the first dot
    pub sample: String,
    /// path to the file
    pub path: PathBuf,
}

/// Return the sample identifier for the given file name.
pub fn sample_id(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map(|(sample, _)| sample)
        .unwrap_or(file_name)
}

/// Whether the file name carries the input suffix.
pub fn is_input_file_name(file_name: &str) -> bool {
    file_name.ends_with(INPUT_SUFFIX) || file_name.ends_with(&format!("{}.gz", INPUT_SUFFIX))
}

/// List the input files in `path_input`, sorted by file name.
pub fn discover<P>(path_input: P) -> Result<Vec<SampleFile>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let path_input = path_input.as_ref();
    if !path_input.is_dir() {
        return Err(MergeError::MissingInputDir(path_input.to_path_buf()).into());
    }

    let mut result = Vec::new();
    for entry in std::fs::read_dir(path_input)
        .map_err(|e| anyhow::anyhow!("could not list directory {:?}: {}", path_input, e))?
    {
        let path = entry?.path();
        let file_name = match path.file_name().and_then(|s| s.to_str()) {
            Some(file_name) => file_name,
            None => {
                tracing::warn!("skipping {:?}, file name is not valid UTF-8", &path);
                continue;
            }
        };
        if path.is_file() && is_input_file_name(file_name) {
            result.push(SampleFile {
                sample: sample_id(file_name).to_string(),
                path: path.clone(),
            });
        } else {
            tracing::trace!("skipping {:?}", &path);
        }
    }
    result.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    let mut seen: HashMap<&str, &PathBuf> = HashMap::with_capacity(result.len());
    for sample_file in &result {
        if let Some(first) = seen.insert(&sample_file.sample, &sample_file.path) {
            return Err(MergeError::DuplicateSample {
                sample: sample_file.sample.clone(),
                first: first.clone(),
                second: sample_file.path.clone(),
            }
            .into());
        }
    }

    Ok(result)
}

/// Row of a per-sample input file.
///
/// The columns dropped from the output are still consumed positionally.
#[derive(Debug, Deserialize)]
pub struct Record {
    /// chromosome name
    pub chrom: String,
    /// 1-based position
    pub pos: u64,
    /// variant ID
    pub id: IgnoredAny,
    /// reference allele
    pub reference: String,
    /// alternative allele
    pub alternative: String,
    /// variant quality
    pub qual: IgnoredAny,
    /// filter column
    pub filter: IgnoredAny,
    /// end position
    pub end: IgnoredAny,
    /// info column
    pub info: IgnoredAny,
    /// colon-separated genotype value, e.g., `0/1:30:20:10,10:0.5:20,0,30`
    pub genotype: String,
}

impl Record {
    /// Construct the locus key of the record.
    pub fn locus_key(&self) -> LocusKey {
        LocusKey {
            chrom: self.chrom.clone(),
            pos: self.pos,
            reference: self.reference.clone(),
            alternative: self.alternative.clone(),
        }
    }
}

/// The non-hom. ref. calls loaded from one sample file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleCalls {
    /// sample identifier
    pub sample: String,
    /// locus and full genotype value, in file order
    pub calls: Vec<(LocusKey, String)>,
    /// number of rows read
    pub count_read: usize,
    /// number of rows dropped as hom. ref.
    pub count_hom_ref: usize,
}

/// Load the calls of one sample, dropping hom. ref. rows.
pub fn load_sample(sample_file: &SampleFile) -> Result<SampleCalls, anyhow::Error> {
    let path = &sample_file.path;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(open_read_maybe_gz(path).map_err(|e| {
            anyhow::anyhow!("could not open file {:?} for reading: {}", path, e)
        })?);

    let mut result = SampleCalls {
        sample: sample_file.sample.clone(),
        ..Default::default()
    };
    for record in reader.records() {
        let record =
            record.map_err(|e| anyhow::anyhow!("problem reading {:?}: {}", path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |reason: String| MergeError::MalformedRecord {
            path: path.clone(),
            line,
            reason,
        };

        if record.len() != NUM_FIELDS {
            return Err(malformed(format!(
                "expected {} fields but found {}",
                NUM_FIELDS,
                record.len()
            ))
            .into());
        }
        let record: Record = record
            .deserialize(None)
            .map_err(|e| malformed(e.to_string()))?;
        if record.genotype.is_empty() {
            return Err(malformed("empty genotype field".into()).into());
        }
        result.count_read += 1;
        if is_hom_ref(&record.genotype) {
            result.count_hom_ref += 1;
            continue;
        }

        for (field, value) in [
            ("CHROM", &record.chrom),
            ("REF", &record.reference),
            ("ALT", &record.alternative),
        ] {
            if value.contains(KEY_DELIMITER) {
                return Err(MergeError::DelimiterInLocusField {
                    path: path.clone(),
                    line,
                    field,
                    value: value.clone(),
                    delimiter: KEY_DELIMITER,
                }
                .into());
            }
        }
        let key = record.locus_key();
        result.calls.push((key, record.genotype));
    }

    Ok(result)
}
