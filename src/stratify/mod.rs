//! Sample stratification by target gene expression.
//!
//! Partitions the sample columns of an expression matrix into High/Low
//! (and, for the interval-based splits, Medium) groups from a single gene's
//! expression row. Only High and Low ever participate in downstream testing;
//! Medium samples are carried in the assignment so stratified visualizations
//! can still see them.

use ndarray::ArrayView1;

use crate::error::{DeError, Result};

/// Minimum samples a retained group needs for the two-sample test.
pub const MIN_GROUP_SIZE: usize = 3;

/// How to split samples on the target gene's expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitMethod {
    /// Threshold at the row median; ties at the threshold go High.
    Median,
    /// High ≥ 75th percentile, Low ≤ 25th percentile, rest Medium.
    Quartile,
    /// High ≥ 67th percentile, Low ≤ 33rd percentile, rest Medium.
    Tertile,
    /// Caller-supplied cut values; samples strictly between them are Medium.
    Custom { high: f64, low: f64 },
}

/// Group label assigned to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupLabel {
    High,
    Low,
    /// Excluded from pairwise testing.
    Medium,
}

impl std::fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupLabel::High => write!(f, "High"),
            GroupLabel::Low => write!(f, "Low"),
            GroupLabel::Medium => write!(f, "Medium"),
        }
    }
}

/// Per-sample group labels, in matrix column order.
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    assignments: Vec<(String, GroupLabel)>,
}

impl GroupAssignment {
    /// Build an assignment from explicit labels, e.g. a clinical category
    /// mapped onto High/Low. Applies the same minimum-group-size rule as
    /// [`stratify`].
    pub fn from_labels(assignments: Vec<(String, GroupLabel)>) -> Result<Self> {
        let assignment = GroupAssignment { assignments };
        assignment.check_group_sizes()?;
        Ok(assignment)
    }

    fn check_group_sizes(&self) -> Result<()> {
        for (label, name) in [(GroupLabel::High, "High"), (GroupLabel::Low, "Low")] {
            let size = self.samples_with(label).len();
            if size < MIN_GROUP_SIZE {
                return Err(DeError::InsufficientGroupSize {
                    label: name.to_string(),
                    size,
                    min: MIN_GROUP_SIZE,
                });
            }
        }
        Ok(())
    }

    /// Label for a sample, if it was assigned.
    pub fn label_of(&self, sample: &str) -> Option<GroupLabel> {
        self.assignments
            .iter()
            .find(|(s, _)| s == sample)
            .map(|(_, l)| *l)
    }

    /// All `(sample, label)` pairs in matrix column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GroupLabel)> {
        self.assignments.iter().map(|(s, l)| (s.as_str(), *l))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn samples_with(&self, label: GroupLabel) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|(_, l)| *l == label)
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn high_samples(&self) -> Vec<String> {
        self.samples_with(GroupLabel::High)
    }

    pub fn low_samples(&self) -> Vec<String> {
        self.samples_with(GroupLabel::Low)
    }

    pub fn medium_samples(&self) -> Vec<String> {
        self.samples_with(GroupLabel::Medium)
    }
}

/// Partition samples into groups from one expression row.
///
/// `values` and `samples` are the row of the target gene and the matrix
/// sample identifiers, in column order. Fails with
/// [`DeError::InsufficientGroupSize`] when High or Low retains fewer than
/// [`MIN_GROUP_SIZE`] samples.
pub fn stratify(
    values: ArrayView1<'_, f64>,
    samples: &[String],
    method: &SplitMethod,
) -> Result<GroupAssignment> {
    if values.len() != samples.len() {
        return Err(DeError::DimensionMismatch {
            expected: format!("{} sample IDs", values.len()),
            got: format!("{} sample IDs", samples.len()),
        });
    }
    if values.is_empty() {
        return Err(DeError::EmptyInput {
            reason: "expression row has no samples".to_string(),
        });
    }

    let (high_cut, low_cut, median_mode) = match method {
        SplitMethod::Median => {
            let m = quantile(values, 0.5);
            (m, m, true)
        }
        SplitMethod::Quartile => (quantile(values, 0.75), quantile(values, 0.25), false),
        SplitMethod::Tertile => (quantile(values, 0.67), quantile(values, 0.33), false),
        SplitMethod::Custom { high, low } => (*high, *low, false),
    };

    let assignments: Vec<(String, GroupLabel)> = samples
        .iter()
        .zip(values.iter())
        .map(|(sample, &value)| {
            // High is checked first so a degenerate row where the cuts
            // coincide labels everything High.
            let label = if value >= high_cut {
                GroupLabel::High
            } else if median_mode || value <= low_cut {
                GroupLabel::Low
            } else {
                GroupLabel::Medium
            };
            (sample.clone(), label)
        })
        .collect();

    let assignment = GroupAssignment { assignments };
    assignment.check_group_sizes()?;

    log::debug!(
        "stratified {} samples: {} high, {} low, {} medium",
        assignment.len(),
        assignment.high_samples().len(),
        assignment.low_samples().len(),
        assignment.medium_samples().len(),
    );

    Ok(assignment)
}

/// Quantile with linear interpolation between order statistics.
pub fn quantile(values: ArrayView1<'_, f64>, prob: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = prob * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}
