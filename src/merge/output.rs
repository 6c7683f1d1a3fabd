//! Writing of the merged matrices.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use super::ds::{LocusKey, Matrix};
use crate::common::io::open_write_maybe_gz;

/// Value of the `INFO` column, describing the fields of the full genotype values.
pub const INFO_FORMAT: &str = "GT:GQ:DP:AD:VAF:PL";

/// Names of the identifying columns, in output order.
pub const LOCUS_COLUMNS: [&str; 4] = ["CHROM", "POS", "REF", "ALT"];

/// The two output flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Flavour {
    /// Full genotype values, with `INFO` column.
    Full,
    /// Genotype call token only, without `INFO` column.
    Reduced,
}

/// Paths of the full and reduced output files.
pub fn output_paths<P>(path_output: P, prefix: &str, run_id: &str) -> (PathBuf, PathBuf)
where
    P: AsRef<Path>,
{
    (
        path_output
            .as_ref()
            .join(format!("{}_info.{}.csv", prefix, run_id)),
        path_output.as_ref().join(format!("{}.{}.csv", prefix, run_id)),
    )
}

/// Header row: identifying columns first, then one column per sample.
pub fn header(matrix: &Matrix, flavour: Flavour) -> Vec<String> {
    let mut result = LOCUS_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    if flavour == Flavour::Full {
        result.push("INFO".into());
    }
    result.extend(matrix.samples().iter().cloned());
    result
}

/// Write `matrix` including header to `writer`, returning the number of rows.
pub fn write_matrix<W: Write>(
    writer: &mut csv::Writer<W>,
    matrix: &Matrix,
    flavour: Flavour,
) -> Result<usize, anyhow::Error> {
    writer.write_record(header(matrix, flavour))?;

    let mut count_rows = 0;
    for (key, row) in matrix.rows() {
        let locus: LocusKey = key.parse()?;
        let pos = locus.pos.to_string();
        let mut record = vec![
            locus.chrom.as_str(),
            pos.as_str(),
            locus.reference.as_str(),
            locus.alternative.as_str(),
        ];
        if flavour == Flavour::Full {
            record.push(INFO_FORMAT);
        }
        record.extend(row.iter().map(|value| value.as_deref().unwrap_or("")));
        writer.write_record(&record)?;
        count_rows += 1;
    }
    writer.flush()?;

    Ok(count_rows)
}

/// Write `matrix` as comma-separated file to `path`.
pub fn write_matrix_to_path<P>(
    path: P,
    matrix: &Matrix,
    flavour: Flavour,
) -> Result<usize, anyhow::Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    tracing::debug!("writing {} matrix to {:?}", flavour, path);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(
            open_write_maybe_gz(path)
                .map_err(|e| anyhow::anyhow!("could not open {:?} for writing: {}", path, e))?,
        );
    write_matrix(&mut writer, matrix, flavour)
}
