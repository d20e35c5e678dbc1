//! Multiple testing correction.
//!
//! Corrects a vector of raw p-values for the number of tests performed.
//! Results come back in input order.

use std::cmp::Ordering;

use crate::error::{DeError, Result};

fn validate(p_values: &[f64]) -> Result<()> {
    if p_values.is_empty() {
        return Err(DeError::EmptyInput {
            reason: "no p-values to correct".to_string(),
        });
    }
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(DeError::InvalidPValue { index: i, value: p });
        }
    }
    Ok(())
}

/// Bonferroni correction: each p-value multiplied by the number of tests,
/// capped at 1.0. Simple and conservative.
pub fn bonferroni(p_values: &[f64]) -> Result<Vec<f64>> {
    validate(p_values)?;
    let m = p_values.len() as f64;
    Ok(p_values.iter().map(|&p| (p * m).min(1.0)).collect())
}

/// Benjamini-Hochberg false-discovery-rate procedure.
///
/// Sorts ascending, computes `p_i * m / rank_i`, then enforces monotonicity
/// with a running minimum from the largest rank down. Guarantees every
/// adjusted value is ≥ its raw p-value and that the rank order of the raw
/// p-values is preserved.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    validate(p_values)?;

    let n = p_values.len();
    let mut indexed: Vec<(usize, f64)> =
        p_values.iter().enumerate().map(|(i, &p)| (i, p)).collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut adjusted = vec![0.0; n];
    let mut current_min = 1.0_f64;

    // Largest rank first so the running minimum flows downward.
    for i in (0..n).rev() {
        let (orig_idx, p) = indexed[i];
        let rank = i + 1;
        let candidate = (p * n as f64 / rank as f64).min(1.0);
        current_min = candidate.min(current_min);
        adjusted[orig_idx] = current_min;
    }

    Ok(adjusted)
}
