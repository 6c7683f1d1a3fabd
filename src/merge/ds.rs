//! Data structures for the cohort genotype matrix.

use std::collections::{btree_map::Entry, BTreeMap};

use crate::err::MergeError;

/// Delimiter used for joining the locus fields into one key.
pub const KEY_DELIMITER: char = '_';

/// Genotype call of homozygous reference calls, these are not merged.
pub const HOM_REF: &str = "0/0";

/// Return the genotype call token, i.e., everything before the first colon.
///
/// A value without colon is its own call token.
pub fn genotype_token(value: &str) -> &str {
    value.split_once(':').map(|(gt, _)| gt).unwrap_or(value)
}

/// Whether the genotype value is a homozygous reference call.
pub fn is_hom_ref(value: &str) -> bool {
    genotype_token(value) == HOM_REF
}

/// Genomic locus, used as the join key between samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocusKey {
    /// chromosome name
    pub chrom: String,
    /// 1-based position
    pub pos: u64,
    /// reference allele
    pub reference: String,
    /// alternative allele
    pub alternative: String,
}

impl std::fmt::Display for LocusKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.chrom,
            self.pos,
            self.reference,
            self.alternative,
            d = KEY_DELIMITER
        )
    }
}

impl std::str::FromStr for LocusKey {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MergeError::MalformedLocusKey(s.to_string());
        let fields = s.split(KEY_DELIMITER).collect::<Vec<_>>();
        match fields.as_slice() {
            [chrom, pos, reference, alternative] => Ok(LocusKey {
                chrom: chrom.to_string(),
                pos: pos.parse().map_err(|_| malformed())?,
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            }),
            _ => Err(malformed()),
        }
    }
}

/// How to handle a locus seen twice for the same sample.
#[derive(
    clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the run.
    #[default]
    Reject,
    /// Keep the value of the first occurrence.
    KeepFirst,
    /// Keep the value of the last occurrence.
    KeepLast,
}

/// Sparse cohort matrix of genotype values.
///
/// Rows are keyed by the locus key text and kept in lexicographic order of
/// that text.  Each row has exactly one slot per sample, `None` meaning that
/// the sample had no qualifying call at the locus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matrix {
    samples: Vec<String>,
    rows: BTreeMap<String, Vec<Option<String>>>,
}

impl Matrix {
    /// Create an empty matrix with one column per sample.
    pub fn new(samples: Vec<String>) -> Self {
        Self {
            samples,
            rows: BTreeMap::new(),
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Number of loci.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in key order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.rows
            .iter()
            .map(|(key, row)| (key.as_str(), row.as_slice()))
    }

    /// Return the row for the given locus key text.
    pub fn get(&self, key: &str) -> Option<&[Option<String>]> {
        self.rows.get(key).map(|row| row.as_slice())
    }

    /// Set the value of sample `sample_idx` at locus `key`.
    ///
    /// Loci not seen before get a new row with all other samples missing.
    pub fn insert(
        &mut self,
        sample_idx: usize,
        key: String,
        value: String,
        policy: DuplicatePolicy,
    ) -> Result<(), MergeError> {
        debug_assert!(sample_idx < self.samples.len());
        match self.rows.entry(key) {
            Entry::Vacant(entry) => {
                let mut row = vec![None; self.samples.len()];
                row[sample_idx] = Some(value);
                entry.insert(row);
            }
            Entry::Occupied(mut entry) => {
                if entry.get()[sample_idx].is_none() {
                    entry.get_mut()[sample_idx] = Some(value);
                } else {
                    match policy {
                        DuplicatePolicy::Reject => {
                            return Err(MergeError::DuplicateLocus {
                                sample: self.samples[sample_idx].clone(),
                                key: entry.key().clone(),
                            })
                        }
                        DuplicatePolicy::KeepFirst => {
                            tracing::debug!(
                                "keeping first value for duplicate locus {} of sample {}",
                                entry.key(),
                                &self.samples[sample_idx]
                            );
                        }
                        DuplicatePolicy::KeepLast => {
                            tracing::debug!(
                                "keeping last value for duplicate locus {} of sample {}",
                                entry.key(),
                                &self.samples[sample_idx]
                            );
                            entry.get_mut()[sample_idx] = Some(value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Derive the matrix holding only the genotype call token of each value.
    ///
    /// Row set and key order are the same as in `self`.
    pub fn reduce(&self) -> Matrix {
        Matrix {
            samples: self.samples.clone(),
            rows: self
                .rows
                .iter()
                .map(|(key, row)| {
                    (
                        key.clone(),
                        row.iter()
                            .map(|value| value.as_deref().map(|v| genotype_token(v).to_string()))
                            .collect(),
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[rstest::rstest]
    #[case("0/1:30:20:10,10:0.5:20,0,30", "0/1")]
    #[case("1/1", "1/1")]
    #[case("0/0:99", "0/0")]
    #[case("./.:0", "./.")]
    #[case(":30", "")]
    fn genotype_token(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(expected, super::genotype_token(value));
    }

    #[rstest::rstest]
    #[case("0/0:99:30", true)]
    #[case("0/0", true)]
    #[case("0|0:99", false)]
    #[case("0/1:30", false)]
    #[case("0/00", false)]
    fn is_hom_ref(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(expected, super::is_hom_ref(value));
    }

    #[test]
    fn locus_key_display_and_parse() -> Result<(), anyhow::Error> {
        let key = LocusKey {
            chrom: "chr1".into(),
            pos: 100,
            reference: "A".into(),
            alternative: "G".into(),
        };

        assert_eq!("chr1_100_A_G", key.to_string());
        assert_eq!(key, "chr1_100_A_G".parse::<LocusKey>()?);

        Ok(())
    }

    #[rstest::rstest]
    #[case("chr1_100_A")]
    #[case("chr1_100_A_G_T")]
    #[case("chr1_x_A_G")]
    #[case("")]
    fn locus_key_malformed(#[case] s: &str) {
        assert_eq!(
            Err(MergeError::MalformedLocusKey(s.to_string())),
            s.parse::<LocusKey>()
        );
    }

    #[rstest::rstest]
    #[case("reject", DuplicatePolicy::Reject)]
    #[case("keep-first", DuplicatePolicy::KeepFirst)]
    #[case("keep-last", DuplicatePolicy::KeepLast)]
    fn duplicate_policy_names(
        #[case] name: &str,
        #[case] policy: DuplicatePolicy,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(name, policy.to_string());
        assert_eq!(policy, name.parse::<DuplicatePolicy>()?);
        Ok(())
    }

    fn two_sample_matrix() -> Result<Matrix, MergeError> {
        let mut matrix = Matrix::new(vec!["A".into(), "B".into()]);
        let policy = DuplicatePolicy::Reject;
        matrix.insert(0, "chr1_100_A_G".into(), "0/1:30:20".into(), policy)?;
        matrix.insert(0, "chr2_5_C_T".into(), "1/1".into(), policy)?;
        matrix.insert(1, "chr1_100_A_G".into(), "1/1:40:25".into(), policy)?;
        matrix.insert(1, "chr1_200_A_T".into(), "0/1:12:8".into(), policy)?;
        Ok(matrix)
    }

    #[test]
    fn matrix_outer_join() -> Result<(), anyhow::Error> {
        let matrix = two_sample_matrix()?;

        assert_eq!(3, matrix.len());
        let rows = matrix
            .rows()
            .map(|(key, row)| (key.to_string(), row.to_vec()))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (
                    "chr1_100_A_G".to_string(),
                    vec![Some("0/1:30:20".to_string()), Some("1/1:40:25".to_string())]
                ),
                (
                    "chr1_200_A_T".to_string(),
                    vec![None, Some("0/1:12:8".to_string())]
                ),
                ("chr2_5_C_T".to_string(), vec![Some("1/1".to_string()), None]),
            ],
            rows
        );

        Ok(())
    }

    #[test]
    fn matrix_content_independent_of_sample_order() -> Result<(), anyhow::Error> {
        let policy = DuplicatePolicy::Reject;
        let mut forward = Matrix::new(vec!["A".into(), "B".into()]);
        forward.insert(0, "chr1_100_A_G".into(), "0/1".into(), policy)?;
        forward.insert(1, "chr1_200_A_T".into(), "1/1".into(), policy)?;
        let mut backward = Matrix::new(vec!["A".into(), "B".into()]);
        backward.insert(1, "chr1_200_A_T".into(), "1/1".into(), policy)?;
        backward.insert(0, "chr1_100_A_G".into(), "0/1".into(), policy)?;

        assert_eq!(forward, backward);

        Ok(())
    }

    #[rstest::rstest]
    #[case(DuplicatePolicy::KeepFirst, "0/1:1")]
    #[case(DuplicatePolicy::KeepLast, "1/1:2")]
    fn matrix_duplicate_kept(
        #[case] policy: DuplicatePolicy,
        #[case] expected: &str,
    ) -> Result<(), anyhow::Error> {
        let mut matrix = Matrix::new(vec!["A".into()]);
        matrix.insert(0, "chr1_100_A_G".into(), "0/1:1".into(), policy)?;
        matrix.insert(0, "chr1_100_A_G".into(), "1/1:2".into(), policy)?;

        assert_eq!(
            Some(&[Some(expected.to_string())][..]),
            matrix.get("chr1_100_A_G")
        );

        Ok(())
    }

    #[test]
    fn matrix_duplicate_rejected() -> Result<(), anyhow::Error> {
        let policy = DuplicatePolicy::Reject;
        let mut matrix = Matrix::new(vec!["A".into(), "B".into()]);
        matrix.insert(1, "chr1_100_A_G".into(), "0/1:1".into(), policy)?;
        // same locus for another sample is not a duplicate
        matrix.insert(0, "chr1_100_A_G".into(), "0/1:1".into(), policy)?;

        assert_eq!(
            Err(MergeError::DuplicateLocus {
                sample: "B".into(),
                key: "chr1_100_A_G".into()
            }),
            matrix.insert(1, "chr1_100_A_G".into(), "1/1:2".into(), policy)
        );

        Ok(())
    }

    #[test]
    fn matrix_reduce() -> Result<(), anyhow::Error> {
        let full = two_sample_matrix()?;
        let reduced = full.reduce();

        assert_eq!(full.samples(), reduced.samples());
        assert_eq!(full.len(), reduced.len());
        for ((full_key, full_row), (reduced_key, reduced_row)) in full.rows().zip(reduced.rows()) {
            assert_eq!(full_key, reduced_key);
            for (full_value, reduced_value) in full_row.iter().zip(reduced_row) {
                assert_eq!(
                    full_value.as_deref().map(super::genotype_token),
                    reduced_value.as_deref()
                );
            }
        }
        assert_eq!(
            Some(&[Some("0/1".to_string()), Some("1/1".to_string())][..]),
            reduced.get("chr1_100_A_G")
        );
        assert_eq!(Some(&[Some("1/1".to_string()), None][..]), reduced.get("chr2_5_C_T"));

        Ok(())
    }
}
