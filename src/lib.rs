//! # stratified-de
//!
//! Expression-stratified differential expression analysis for bulk
//! transcriptomic cohorts.
//!
//! This crate splits the samples of an expression matrix into High/Low
//! groups on a chosen gene's expression level, runs a per-gene two-sample
//! test between the groups across the whole matrix, corrects for multiple
//! comparisons, and classifies every gene as up-regulated, down-regulated,
//! or not significant. It is intentionally mean/variance-agnostic: values
//! are compared on a log2(x + 1) scale with a plain t-test, as a fast,
//! dependency-light alternative to model-based pipelines.
//!
//! ## Core Features
//!
//! - **Gene Resolution**: symbol-map and accession lookup with
//!   version-suffix handling and explicit ambiguity reporting
//! - **Stratification**: median, quartile, tertile, and custom-threshold
//!   splits with a minimum-group-size guarantee
//! - **Differential Expression**: Welch's or Student's t-test per gene,
//!   parallelized across rows
//! - **Multiple Testing Correction**: Benjamini-Hochberg FDR (Bonferroni
//!   also available)
//! - **Classification**: up/down/not-significant labels from adjusted
//!   p-value and fold-change thresholds
//!
//! ## Quick Start
//!
//! Build a [`matrix::ExpressionMatrix`] and a [`matrix::GeneSymbolMap`],
//! then run [`analysis::StratifiedAnalysis::run`] with a target gene name.
//! The returned table is ordered by ascending adjusted p-value and carries
//! the group assignment for downstream stratified plots.
//!
//! ## Module Organization
//!
//! - **[`matrix`]**: expression matrix and gene symbol map containers
//! - **[`resolve`]**: gene name to matrix row key resolution
//! - **[`stratify`]**: expression-based sample grouping
//! - **[`testing`]**: two-sample tests, correction, and result types
//! - **[`classify`]**: significance labeling
//! - **[`analysis`]**: the assembled pipeline and its configuration
//! - **[`error`]**: the crate error taxonomy

pub mod analysis;
pub mod classify;
pub mod error;
pub mod matrix;
pub mod resolve;
pub mod stratify;
pub mod testing;
