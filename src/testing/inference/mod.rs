//! Matrix-level differential expression engine.
//!
//! Runs the per-gene two-sample test across every row of an expression
//! matrix. Each gene reads only its own row and the shared group indices, so
//! the pass is parallelized with rayon; results are joined before any
//! correction happens.

pub mod parametric;

use ndarray::ArrayView1;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{DeError, Result};
use crate::matrix::ExpressionMatrix;
use crate::testing::{GeneComparison, TTestType};

/// Pseudocount added before the log2 transform to stabilize near-zero
/// magnitudes.
pub const PSEUDOCOUNT: f64 = 1.0;

/// Minimum values per group slice for a gene to be tested.
const MIN_SLICE: usize = 3;

/// Compare every gene between two sample groups.
///
/// `group_a` is the reference; fold changes read "group B relative to
/// group A". Genes whose slices have fewer than 3 values are omitted from
/// the output; genes with an undefined statistic (zero variance, coinciding
/// means) are reported with a NaN statistic and p = 1 so they survive into
/// the table as not-significant.
pub fn compare_groups(
    matrix: &ExpressionMatrix,
    group_a: &[String],
    group_b: &[String],
    test_type: TTestType,
) -> Result<Vec<GeneComparison>> {
    if group_a.is_empty() || group_b.is_empty() {
        return Err(DeError::EmptyInput {
            reason: "group sample lists cannot be empty".to_string(),
        });
    }

    let a_indices = matrix.sample_indices(group_a)?;
    let b_indices = matrix.sample_indices(group_b)?;

    let comparisons: Vec<GeneComparison> = (0..matrix.n_genes())
        .into_par_iter()
        .filter_map(|gene_idx| {
            compare_row(
                gene_idx,
                matrix.row_at(gene_idx),
                &a_indices,
                &b_indices,
                test_type,
            )
        })
        .collect();

    let undefined = comparisons
        .iter()
        .filter(|c| c.statistic.is_nan())
        .count();
    if undefined > 0 {
        log::warn!(
            "{undefined} of {} genes had an undefined test statistic (zero variance)",
            comparisons.len()
        );
    }

    Ok(comparisons)
}

fn compare_row(
    gene_index: usize,
    row: ArrayView1<'_, f64>,
    a_indices: &[usize],
    b_indices: &[usize],
    test_type: TTestType,
) -> Option<GeneComparison> {
    if a_indices.len() < MIN_SLICE || b_indices.len() < MIN_SLICE {
        return None;
    }

    let a_raw: Vec<f64> = a_indices.iter().map(|&i| row[i]).collect();
    let b_raw: Vec<f64> = b_indices.iter().map(|&i| row[i]).collect();

    let a_log: Vec<f64> = a_raw.iter().map(|&x| (x + PSEUDOCOUNT).log2()).collect();
    let b_log: Vec<f64> = b_raw.iter().map(|&x| (x + PSEUDOCOUNT).log2()).collect();

    // Group B first so the statistic's sign agrees with the fold change.
    let result = parametric::t_test(&b_log, &a_log, test_type);

    let log2_fold_change = mean(&b_log) - mean(&a_log);

    let base_mean = (a_raw.iter().sum::<f64>() + b_raw.iter().sum::<f64>())
        / (a_raw.len() + b_raw.len()) as f64;

    Some(GeneComparison {
        gene_index,
        base_mean,
        log2_fold_change,
        statistic: result.statistic,
        p_value: result.p_value,
        group_a_mean: mean(&a_raw),
        group_a_std: sample_std(&a_raw),
        group_b_mean: mean(&b_raw),
        group_b_std: sample_std(&b_raw),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}
