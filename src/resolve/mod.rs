//! Gene name resolution against the expression matrix.
//!
//! Maps a human-readable gene name (usually a symbol like `TP53`) to the
//! matrix row key that carries it (usually a versioned accession like
//! `ENSG00000141510.11`). Symbol-map hits are tried first, then exact
//! identifier matches after version stripping; a raw substring scan runs
//! only when explicitly enabled. Any multiplicity of candidates is an error
//! carrying the full candidate list — two accessions sharing a prefix
//! (`ENSG1`, `ENSG10`) must never silently resolve to whichever comes
//! first.

use crate::error::{DeError, Result};
use crate::matrix::{ExpressionMatrix, GeneSymbolMap, strip_version};

/// Resolution behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Fall back to a case-insensitive substring scan of the matrix keys
    /// when neither the symbol map nor exact identifier matching hits.
    pub substring_fallback: bool,
}

/// Resolve a gene name to its matrix row key.
pub fn resolve(
    target: &str,
    matrix: &ExpressionMatrix,
    symbols: &GeneSymbolMap,
    options: &ResolveOptions,
) -> Result<String> {
    let target_upper = target.trim().to_uppercase();
    if target_upper.is_empty() {
        return Err(DeError::GeneNotFound {
            query: target.to_string(),
        });
    }

    // 1. Symbol map: collect source identifiers whose symbol matches, then
    //    locate them among the matrix keys by exact stripped-identifier
    //    match (handles version suffixes on the matrix side).
    let mut candidates = symbol_candidates(&target_upper, matrix, symbols);

    // 2. Direct identifier: the caller typed an accession rather than a
    //    symbol.
    if candidates.is_empty() {
        candidates = matrix
            .gene_ids()
            .iter()
            .filter(|id| strip_version(id).to_uppercase() == target_upper)
            .cloned()
            .collect();
    }

    // 3. Substring scan, opt-in only.
    if candidates.is_empty() && options.substring_fallback {
        candidates = matrix
            .gene_ids()
            .iter()
            .filter(|id| id.to_uppercase().contains(&target_upper))
            .cloned()
            .collect();
        if !candidates.is_empty() {
            log::debug!(
                "resolved '{target}' by substring scan ({} candidate(s))",
                candidates.len()
            );
        }
    }

    match candidates.len() {
        0 => Err(DeError::GeneNotFound {
            query: target.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(DeError::AmbiguousGene {
            query: target.to_string(),
            candidates,
        }),
    }
}

fn symbol_candidates(
    target_upper: &str,
    matrix: &ExpressionMatrix,
    symbols: &GeneSymbolMap,
) -> Vec<String> {
    let source_ids: Vec<&str> = symbols
        .iter()
        .filter(|(_, symbol)| symbol.to_uppercase() == target_upper)
        .map(|(id, _)| id)
        .collect();
    if source_ids.is_empty() {
        return Vec::new();
    }

    matrix
        .gene_ids()
        .iter()
        .filter(|key| {
            let stripped = strip_version(key);
            source_ids.iter().any(|id| stripped == *id)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn matrix_with_genes(genes: &[&str]) -> ExpressionMatrix {
        let n = genes.len();
        let samples: Vec<String> = (1..=4).map(|i| format!("s{i}")).collect();
        ExpressionMatrix::new(Array2::ones((n, 4)), ids(genes), samples).unwrap()
    }

    #[test]
    fn test_symbol_resolution_with_version_suffix() {
        let matrix = matrix_with_genes(&["ENSG1.3", "ENSG2.1"]);
        let symbols = GeneSymbolMap::from_iter([("ENSG1", "TP53")]);
        let key = resolve("tp53", &matrix, &symbols, &ResolveOptions::default()).unwrap();
        assert_eq!(key, "ENSG1.3");
        // Any case works.
        let key = resolve("Tp53", &matrix, &symbols, &ResolveOptions::default()).unwrap();
        assert_eq!(key, "ENSG1.3");
    }

    #[test]
    fn test_shared_prefix_does_not_collide() {
        // ENSG1 must not match ENSG10 once versions are stripped.
        let matrix = matrix_with_genes(&["ENSG10.2", "ENSG1.5"]);
        let symbols = GeneSymbolMap::from_iter([("ENSG1", "TP53")]);
        let key = resolve("TP53", &matrix, &symbols, &ResolveOptions::default()).unwrap();
        assert_eq!(key, "ENSG1.5");
    }

    #[test]
    fn test_direct_identifier_match() {
        let matrix = matrix_with_genes(&["ENSG1.3", "ENSG2.1"]);
        let symbols = GeneSymbolMap::new();
        let key = resolve("ensg2", &matrix, &symbols, &ResolveOptions::default()).unwrap();
        assert_eq!(key, "ENSG2.1");
    }

    #[test]
    fn test_not_found_without_fallback() {
        let matrix = matrix_with_genes(&["ENSG1.3_TP53", "ENSG2.1"]);
        let symbols = GeneSymbolMap::new();
        let result = resolve("TP53", &matrix, &symbols, &ResolveOptions::default());
        assert!(matches!(result, Err(DeError::GeneNotFound { .. })));
    }

    #[test]
    fn test_substring_fallback_opt_in() {
        let matrix = matrix_with_genes(&["ENSG1.3_TP53", "ENSG2.1"]);
        let symbols = GeneSymbolMap::new();
        let options = ResolveOptions {
            substring_fallback: true,
        };
        let key = resolve("TP53", &matrix, &symbols, &options).unwrap();
        assert_eq!(key, "ENSG1.3_TP53");
    }

    #[test]
    fn test_ambiguous_substring_reports_candidates() {
        let matrix = matrix_with_genes(&["A_TP53", "B_TP53", "ENSG2.1"]);
        let symbols = GeneSymbolMap::new();
        let options = ResolveOptions {
            substring_fallback: true,
        };
        match resolve("TP53", &matrix, &symbols, &options) {
            Err(DeError::AmbiguousGene { candidates, .. }) => {
                assert_eq!(candidates, ids(&["A_TP53", "B_TP53"]));
            }
            other => panic!("expected AmbiguousGene, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_query() {
        let matrix = matrix_with_genes(&["ENSG1.3"]);
        let symbols = GeneSymbolMap::new();
        let result = resolve("   ", &matrix, &symbols, &ResolveOptions::default());
        assert!(matches!(result, Err(DeError::GeneNotFound { .. })));
    }
}
