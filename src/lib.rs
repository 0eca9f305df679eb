//! Attrition Risk Engine Library
//!
//! Loads the HR employee dataset, trains a class-balanced logistic regression
//! that predicts resignation, and scores individual employee profiles with a
//! rule-based explanation of their risk factors.

pub mod config;
pub mod error;
pub mod explainer;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod overview;
pub mod preprocessing;
pub mod training;
pub mod types;

pub use config::AppConfig;
pub use error::{AttritionError, Result};
pub use explainer::{explain, Explanation, ReferenceStats};
pub use loader::DataLoader;
pub use metrics::EvaluationMetrics;
pub use models::inference::PredictionEngine;
pub use overview::DataOverview;
pub use training::{ModelTrainer, TrainingOutcome};
pub use types::{assessment::RiskAssessment, form::EmployeeForm, table::Table};
