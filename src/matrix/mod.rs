//! Expression matrix and gene symbol map containers.
//!
//! The matrix is a dense genes × samples table with string identifiers on
//! both axes. All structural validation happens in the constructor so that
//! downstream slicing never has to re-check for NaN, negative magnitudes, or
//! duplicate keys.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{DeError, Result};

/// Strip a version suffix from an accession (`ENSG00000141510.11` →
/// `ENSG00000141510`). Identifiers without a `.` pass through unchanged.
pub fn strip_version(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}

/// A dense expression matrix, rows keyed by gene identifier and columns by
/// sample identifier.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    values: Array2<f64>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
    gene_index: HashMap<String, usize>,
    sample_index: HashMap<String, usize>,
}

impl ExpressionMatrix {
    /// Create a new expression matrix from raw data.
    ///
    /// Validates that the identifier vectors match the matrix dimensions,
    /// that identifiers on each axis are unique, and that every value is a
    /// finite non-negative magnitude.
    pub fn new(
        values: Array2<f64>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (n_genes, n_samples) = values.dim();

        if gene_ids.len() != n_genes {
            return Err(DeError::DimensionMismatch {
                expected: format!("{n_genes} gene IDs"),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }
        if sample_ids.len() != n_samples {
            return Err(DeError::DimensionMismatch {
                expected: format!("{n_samples} sample IDs"),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }
        if values.iter().any(|&x| !x.is_finite() || x < 0.0) {
            return Err(DeError::InvalidMatrix {
                reason: "expression values must be finite and non-negative".to_string(),
            });
        }

        let gene_index = build_index(&gene_ids, "gene")?;
        let sample_index = build_index(&sample_ids, "sample")?;

        Ok(Self {
            values,
            gene_ids,
            sample_ids,
            gene_index,
            sample_index,
        })
    }

    pub fn n_genes(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Row view for a gene by matrix key.
    pub fn row(&self, gene_id: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self
            .gene_index
            .get(gene_id)
            .ok_or_else(|| DeError::GeneNotFound {
                query: gene_id.to_string(),
            })?;
        Ok(self.values.row(*idx))
    }

    /// Row view by positional index.
    pub fn row_at(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// Map sample identifiers to column indices, rejecting unknown samples.
    pub fn sample_indices(&self, samples: &[String]) -> Result<Vec<usize>> {
        samples
            .iter()
            .map(|s| {
                self.sample_index
                    .get(s)
                    .copied()
                    .ok_or_else(|| DeError::UnknownSample { id: s.clone() })
            })
            .collect()
    }
}

fn build_index(ids: &[String], kind: &'static str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(DeError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(index)
}

/// Mapping from stable gene identifiers to display symbols.
///
/// Keys are stored without version suffixes, so `ENSG00000141510.11` and
/// `ENSG00000141510` address the same entry.
#[derive(Debug, Clone, Default)]
pub struct GeneSymbolMap {
    symbols: HashMap<String, String>,
}

impl GeneSymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_iter<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (id, symbol) in entries {
            map.insert(id.into(), symbol.into());
        }
        map
    }

    pub fn insert(&mut self, gene_id: String, symbol: String) {
        let key = strip_version(&gene_id).to_string();
        self.symbols.insert(key, symbol);
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Look up the symbol for a (possibly versioned) gene identifier.
    pub fn get(&self, gene_id: &str) -> Option<&str> {
        self.symbols.get(strip_version(gene_id)).map(String::as_str)
    }

    /// Display symbol for a gene, falling back to the stripped identifier
    /// when no symbol is known.
    pub fn symbol_for(&self, gene_id: &str) -> String {
        let clean = strip_version(gene_id);
        self.symbols
            .get(clean)
            .cloned()
            .unwrap_or_else(|| clean.to_string())
    }

    /// Iterate `(stable identifier, symbol)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
