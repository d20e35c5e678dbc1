//! The stratified differential expression pipeline.
//!
//! Ties the components together: resolve the target gene, stratify samples
//! on its expression row, compare High against Low across the whole matrix,
//! correct for multiple testing, classify, and sort. The
//! [`StratifiedAnalysis`] context is caller-owned and threads explicitly
//! through every step; nothing here keeps ambient state between runs.

use crate::classify::{Significance, classify};
use crate::error::{DeError, Result};
use crate::matrix::{ExpressionMatrix, GeneSymbolMap};
use crate::resolve::{ResolveOptions, resolve};
use crate::stratify::{GroupAssignment, SplitMethod, stratify};
use crate::testing::correction::benjamini_hochberg;
use crate::testing::inference::compare_groups;
use crate::testing::{DeRecord, DeTable, TTestType};

/// Analysis configuration. Every field is always present; validation happens
/// once at the start of a run.
#[derive(Debug, Clone, Copy)]
pub struct DeOptions {
    pub split: SplitMethod,
    pub test: TTestType,
    /// Adjusted p-value cutoff for classification.
    pub p_threshold: f64,
    /// Absolute log2 fold change cutoff for classification.
    pub fc_threshold: f64,
    /// Allow substring matching when resolving the target gene.
    pub substring_fallback: bool,
}

impl Default for DeOptions {
    fn default() -> Self {
        DeOptions {
            split: SplitMethod::Median,
            test: TTestType::Welch,
            p_threshold: 0.05,
            fc_threshold: 1.0,
            substring_fallback: false,
        }
    }
}

impl DeOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.p_threshold.is_finite() || self.p_threshold <= 0.0 || self.p_threshold > 1.0 {
            return Err(DeError::InvalidOptions {
                reason: format!("p_threshold must be in (0, 1], got {}", self.p_threshold),
            });
        }
        if !self.fc_threshold.is_finite() || self.fc_threshold < 0.0 {
            return Err(DeError::InvalidOptions {
                reason: format!("fc_threshold must be non-negative, got {}", self.fc_threshold),
            });
        }
        if let SplitMethod::Custom { high, low } = self.split {
            if !high.is_finite() || !low.is_finite() {
                return Err(DeError::InvalidOptions {
                    reason: "custom split thresholds must be finite".to_string(),
                });
            }
            if high < low {
                return Err(DeError::InvalidOptions {
                    reason: format!(
                        "custom high threshold {high} is below low threshold {low}"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct DeAnalysisResult {
    /// Matrix row key the target name resolved to.
    pub target_gene_id: String,
    /// Per-sample group labels, for stratified visualizations.
    pub groups: GroupAssignment,
    /// Result table, sorted by ascending adjusted p-value.
    pub table: DeTable,
}

/// Caller-owned analysis context.
///
/// Borrows the expression matrix and symbol map for the duration of a run;
/// the matrix is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedAnalysis<'a> {
    matrix: &'a ExpressionMatrix,
    symbols: &'a GeneSymbolMap,
    options: DeOptions,
}

impl<'a> StratifiedAnalysis<'a> {
    pub fn new(
        matrix: &'a ExpressionMatrix,
        symbols: &'a GeneSymbolMap,
        options: DeOptions,
    ) -> Self {
        StratifiedAnalysis {
            matrix,
            symbols,
            options,
        }
    }

    pub fn options(&self) -> &DeOptions {
        &self.options
    }

    /// Run the full pipeline for one target gene.
    ///
    /// Resolution and stratification failures abort the run with no partial
    /// table; per-gene degeneracies never do.
    pub fn run(&self, target_gene: &str) -> Result<DeAnalysisResult> {
        self.options.validate()?;

        let resolve_options = ResolveOptions {
            substring_fallback: self.options.substring_fallback,
        };
        let target_gene_id = resolve(target_gene, self.matrix, self.symbols, &resolve_options)?;
        log::debug!("target '{target_gene}' resolved to row '{target_gene_id}'");

        let row = self.matrix.row(&target_gene_id)?;
        let groups = stratify(row, self.matrix.sample_ids(), &self.options.split)?;

        let table = self.compare(&groups)?;

        Ok(DeAnalysisResult {
            target_gene_id,
            groups,
            table,
        })
    }

    /// Test every gene between an existing assignment's Low (reference) and
    /// High groups, correct, classify, and sort.
    ///
    /// Useful when the grouping comes from somewhere other than a gene's
    /// expression row, e.g. a clinical category.
    pub fn compare(&self, groups: &GroupAssignment) -> Result<DeTable> {
        self.options.validate()?;

        let low = groups.low_samples();
        let high = groups.high_samples();

        // Low is the reference: fold changes read "High relative to Low".
        let comparisons = compare_groups(self.matrix, &low, &high, self.options.test)?;
        if comparisons.is_empty() {
            return Err(DeError::EmptyInput {
                reason: "no gene had enough values in both groups".to_string(),
            });
        }

        let p_values: Vec<f64> = comparisons.iter().map(|c| c.p_value).collect();
        let adjusted = benjamini_hochberg(&p_values)?;

        let gene_ids = self.matrix.gene_ids();
        let records: Vec<DeRecord> = comparisons
            .iter()
            .zip(adjusted.iter())
            .map(|(c, &adj_p)| {
                let gene_id = gene_ids[c.gene_index].clone();
                let significance = if c.statistic.is_nan() {
                    // Undefined statistic: never significant, whatever the
                    // thresholds.
                    Significance::NotSignificant
                } else {
                    classify(
                        c.log2_fold_change,
                        adj_p,
                        self.options.p_threshold,
                        self.options.fc_threshold,
                    )
                };
                DeRecord {
                    gene_symbol: self.symbols.symbol_for(&gene_id),
                    gene_id,
                    base_mean: c.base_mean,
                    log2_fold_change: c.log2_fold_change,
                    statistic: c.statistic,
                    p_value: c.p_value,
                    adj_p_value: adj_p,
                    significance,
                    group_a_mean: c.group_a_mean,
                    group_a_std: c.group_a_std,
                    group_b_mean: c.group_b_mean,
                    group_b_std: c.group_b_std,
                }
            })
            .collect();

        let mut table = DeTable::new(records);
        table.sort_by_adjusted_p();

        let summary = table.summary();
        log::debug!(
            "tested {} genes: {} up, {} down, {} ns",
            summary.total,
            summary.up,
            summary.down,
            summary.not_significant
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        assert!(DeOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_p_threshold() {
        let options = DeOptions {
            p_threshold: 0.0,
            ..DeOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(DeError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_invalid_custom_cuts() {
        let options = DeOptions {
            split: SplitMethod::Custom {
                high: 1.0,
                low: 5.0,
            },
            ..DeOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(DeError::InvalidOptions { .. })
        ));

        let options = DeOptions {
            split: SplitMethod::Custom {
                high: f64::NAN,
                low: 0.0,
            },
            ..DeOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_negative_fc_threshold_rejected() {
        let options = DeOptions {
            fc_threshold: -1.0,
            ..DeOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
