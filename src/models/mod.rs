//! Classifier, fitted pipeline and single-employee inference

pub mod inference;
pub mod logistic;
pub mod pipeline;

pub use inference::{PredictionEngine, Record};
pub use logistic::{ClassWeight, LogisticRegression, Solver};
pub use pipeline::TrainedPipeline;
