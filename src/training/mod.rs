//! Model training: cleaning, stratified split, fit and evaluation

pub mod split;
pub mod trainer;

pub use split::{stratified_split, SplitIndices};
pub use trainer::{clean, split_features, FeatureSet, ModelTrainer, TrainingOutcome};
