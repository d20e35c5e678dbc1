//! Statistical testing: per-gene two-sample tests, multiple testing
//! correction, and the result types shared across the pipeline.

pub mod correction;
pub mod inference;

use crate::classify::Significance;

/// Which two-sample t-test to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTestType {
    /// Pooled variance (equal variances assumed).
    Student,
    /// Unequal variances (Welch-Satterthwaite degrees of freedom).
    Welch,
}

/// Outcome of a single two-sample test.
///
/// A NaN statistic marks an undefined test (zero variance in both groups
/// with coinciding means); the p-value is then 1.0.
#[derive(Debug, Clone, Copy)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

impl TestResult {
    pub fn new(statistic: f64, p_value: f64, degrees_of_freedom: f64) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom,
        }
    }

    /// Whether the test statistic is defined.
    pub fn is_defined(&self) -> bool {
        !self.statistic.is_nan()
    }
}

/// Per-gene comparison produced by the engine, before correction.
#[derive(Debug, Clone)]
pub struct GeneComparison {
    /// Row index in the source matrix.
    pub gene_index: usize,
    /// Raw-space mean over the samples considered (both groups).
    pub base_mean: f64,
    /// mean(log2 group B) − mean(log2 group A).
    pub log2_fold_change: f64,
    pub statistic: f64,
    pub p_value: f64,
    /// Raw-space descriptive statistics per group.
    pub group_a_mean: f64,
    pub group_a_std: f64,
    pub group_b_mean: f64,
    pub group_b_std: f64,
}

/// One row of the final result table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeRecord {
    pub gene_id: String,
    pub gene_symbol: String,
    pub base_mean: f64,
    pub log2_fold_change: f64,
    /// NaN when the test statistic was undefined for this gene.
    pub statistic: f64,
    pub p_value: f64,
    pub adj_p_value: f64,
    pub significance: Significance,
    pub group_a_mean: f64,
    pub group_a_std: f64,
    pub group_b_mean: f64,
    pub group_b_std: f64,
}

/// Counts of classified genes in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub not_significant: usize,
}

/// Result table, canonically ordered by ascending adjusted p-value.
#[derive(Debug, Clone, Default)]
pub struct DeTable {
    records: Vec<DeRecord>,
}

impl DeTable {
    pub fn new(records: Vec<DeRecord>) -> Self {
        DeTable { records }
    }

    pub fn records(&self) -> &[DeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stable sort by ascending adjusted p-value. Stability keeps re-runs
    /// byte-identical when adjusted p-values tie.
    pub fn sort_by_adjusted_p(&mut self) {
        self.records.sort_by(|a, b| {
            a.adj_p_value
                .partial_cmp(&b.adj_p_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Records classified as up- or down-regulated.
    pub fn significant(&self) -> impl Iterator<Item = &DeRecord> {
        self.records
            .iter()
            .filter(|r| r.significance != Significance::NotSignificant)
    }

    /// First `n` records of the table in canonical order.
    pub fn top(&self, n: usize) -> &[DeRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn summary(&self) -> DeSummary {
        let mut up = 0;
        let mut down = 0;
        for record in &self.records {
            match record.significance {
                Significance::Up => up += 1,
                Significance::Down => down += 1,
                Significance::NotSignificant => {}
            }
        }
        DeSummary {
            total: self.records.len(),
            up,
            down,
            not_significant: self.records.len() - up - down,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(gene: &str, padj: f64, sig: Significance) -> DeRecord {
        DeRecord {
            gene_id: gene.to_string(),
            gene_symbol: gene.to_string(),
            base_mean: 1.0,
            log2_fold_change: 0.0,
            statistic: 0.0,
            p_value: padj,
            adj_p_value: padj,
            significance: sig,
            group_a_mean: 0.0,
            group_a_std: 0.0,
            group_b_mean: 0.0,
            group_b_std: 0.0,
        }
    }

    #[test]
    fn test_sort_and_top() {
        let mut table = DeTable::new(vec![
            record("g1", 0.8, Significance::NotSignificant),
            record("g2", 0.01, Significance::Up),
            record("g3", 0.2, Significance::NotSignificant),
        ]);
        table.sort_by_adjusted_p();
        let ids: Vec<_> = table.iter().map(|r| r.gene_id.as_str()).collect();
        assert_eq!(ids, vec!["g2", "g3", "g1"]);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.top(10).len(), 3);
    }

    #[test]
    fn test_summary_counts() {
        let table = DeTable::new(vec![
            record("g1", 0.01, Significance::Up),
            record("g2", 0.02, Significance::Down),
            record("g3", 0.03, Significance::Down),
            record("g4", 0.9, Significance::NotSignificant),
        ]);
        let summary = table.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 2);
        assert_eq!(summary.not_significant, 1);
        assert_eq!(table.significant().count(), 3);
    }
}
