//! Classifier Module - random forest over CART trees
//!
//! Deterministic given the seed in [`ForestParams`]; the whole model is plain
//! data and serializes with serde.

pub mod forest;
pub mod tree;


pub use forest::{ForestParams, RandomForest};
pub use tree::{DecisionTree, Node, TreeParams};

use thiserror::Error;

/// Errors while fitting
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("features and target differ in length ({features} vs {target})")]
    LengthMismatch { features: usize, target: usize },

    #[error("row {row} has {actual} features, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("row {row} contains a non-finite value")]
    NonFinite { row: usize },

    #[error("sample index {index} outside 0..{n_rows}")]
    SampleOutOfRange { index: usize, n_rows: usize },

    #[error("label {label} outside 0..{n_classes}")]
    UnknownLabel { label: usize, n_classes: usize },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

/// Errors while querying a fitted model
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("input contains a non-finite value")]
    NonFiniteInput,

    #[error("model is corrupt: {0}")]
    Corrupt(String),
}
