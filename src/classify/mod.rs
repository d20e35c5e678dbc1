//! Significance classification of tested genes.

/// Direction call for a tested gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Significance {
    Up,
    Down,
    NotSignificant,
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Up => write!(f, "up"),
            Significance::Down => write!(f, "down"),
            Significance::NotSignificant => write!(f, "ns"),
        }
    }
}

/// Classify one gene from its adjusted p-value and log2 fold change.
///
/// Up requires `adj_p < p_threshold` and `log2_fc > fc_threshold`; Down the
/// mirrored fold-change condition. The sign comparisons are mutually
/// exclusive, so no gene can satisfy both.
pub fn classify(
    log2_fold_change: f64,
    adj_p_value: f64,
    p_threshold: f64,
    fc_threshold: f64,
) -> Significance {
    if adj_p_value < p_threshold {
        if log2_fold_change > fc_threshold {
            return Significance::Up;
        }
        if log2_fold_change < -fc_threshold {
            return Significance::Down;
        }
    }
    Significance::NotSignificant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_rule() {
        assert_eq!(classify(2.5, 0.001, 0.05, 1.0), Significance::Up);
        assert_eq!(classify(-2.5, 0.001, 0.05, 1.0), Significance::Down);
        assert_eq!(classify(2.5, 0.2, 0.05, 1.0), Significance::NotSignificant);
        assert_eq!(classify(0.5, 0.001, 0.05, 1.0), Significance::NotSignificant);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        // Equality with either threshold does not qualify.
        assert_eq!(classify(1.0, 0.001, 0.05, 1.0), Significance::NotSignificant);
        assert_eq!(classify(2.0, 0.05, 0.05, 1.0), Significance::NotSignificant);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Significance::Up.to_string(), "up");
        assert_eq!(Significance::Down.to_string(), "down");
        assert_eq!(Significance::NotSignificant.to_string(), "ns");
    }
}
