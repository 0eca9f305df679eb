//! Hold-out evaluation metrics for the attrition classifier.
//!
//! The positive class is 1 ("resigned"). Ratios with a zero denominator are
//! reported as 0.0.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Interior width of the summary box
pub const SUMMARY_WIDTH: usize = 62;

/// 2x2 confusion matrix, rows = actual, columns = predicted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// Count outcomes for paired labels in {0, 1}
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> Self {
        let mut cm = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (1, 1) => cm.true_positive += 1,
                (1, _) => cm.false_negative += 1,
                (_, 1) => cm.false_positive += 1,
                _ => cm.true_negative += 1,
            }
        }
        cm
    }

    /// `[[tn, fp], [fn, tp]]`
    pub fn as_array(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Metrics for the positive (resign) class
    pub fn positive_class(&self) -> ClassMetrics {
        ClassMetrics::new(
            self.true_positive,
            self.false_positive,
            self.false_negative,
            self.true_positive + self.false_negative,
        )
    }

    /// Metrics for the negative (stay) class
    pub fn negative_class(&self) -> ClassMetrics {
        ClassMetrics::new(
            self.true_negative,
            self.false_negative,
            self.false_positive,
            self.true_negative + self.false_positive,
        )
    }
}

/// Precision, recall, F1 and support for one class (or an average of classes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn new(hits: usize, false_alarms: usize, misses: usize, support: usize) -> Self {
        let precision = ratio(hits, hits + false_alarms);
        let recall = ratio(hits, hits + misses);
        Self {
            precision,
            recall,
            f1_score: f1(precision, recall),
            support,
        }
    }
}

/// Per-class detail report with accuracy and averaged rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Class 0
    pub stay: ClassMetrics,
    /// Class 1
    pub resign: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let stay = cm.negative_class();
        let resign = cm.positive_class();
        let total = cm.total();

        let macro_avg = ClassMetrics {
            precision: (stay.precision + resign.precision) / 2.0,
            recall: (stay.recall + resign.recall) / 2.0,
            f1_score: (stay.f1_score + resign.f1_score) / 2.0,
            support: total,
        };

        let weighted = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                (pick(&stay) * stay.support as f64 + pick(&resign) * resign.support as f64)
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1_score: weighted(|m| m.f1_score),
            support: total,
        };

        Self {
            stay,
            resign,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

/// Metrics bundle computed once on the held-out split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    /// Precision of the resign class
    pub precision: f64,
    /// Recall of the resign class
    pub recall: f64,
    /// F1 of the resign class
    pub f1: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl EvaluationMetrics {
    pub fn evaluate(actual: &[u8], predicted: &[u8]) -> Self {
        let confusion_matrix = ConfusionMatrix::from_labels(actual, predicted);
        let report = ClassificationReport::from_confusion(&confusion_matrix);
        Self {
            accuracy: report.accuracy,
            precision: report.resign.precision,
            recall: report.resign.recall,
            f1: report.resign.f1_score,
            confusion_matrix,
            report,
        }
    }

    /// Number of evaluated rows
    pub fn test_rows(&self) -> usize {
        self.confusion_matrix.total()
    }

    /// Log the performance summary
    pub fn print_summary(&self) {
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }

    /// Box-drawn summary, every line `SUMMARY_WIDTH + 2` characters wide
    pub fn summary_lines(&self) -> Vec<String> {
        let cm = &self.confusion_matrix;
        let rule = "═".repeat(SUMMARY_WIDTH);

        let mut lines = vec![
            format!("╔{rule}╗"),
            boxed(format!(
                "{:^width$}",
                "ATTRITION MODEL - LOGISTIC REGRESSION PERFORMANCE",
                width = SUMMARY_WIDTH
            )),
            format!("╠{rule}╣"),
            boxed(format!(
                " Accuracy: {:>5.2}  Precision (Resign): {:>5.2}",
                self.accuracy, self.precision
            )),
            boxed(format!(
                " Recall (Resign): {:>5.2}  F1-Score (Resign): {:>5.2}",
                self.recall, self.f1
            )),
            format!("╠{rule}╣"),
            boxed(" Confusion Matrix (rows = actual, columns = predicted)".to_string()),
            boxed(format!(
                " {:<20}{:>18}  {:>20}",
                "", "Predicted Stay (0)", "Predicted Resign (1)"
            )),
            boxed(format!(
                " {:<20}{:>18}  {:>20}",
                "Actual Stay (0)", cm.true_negative, cm.false_positive
            )),
            boxed(format!(
                " {:<20}{:>18}  {:>20}",
                "Actual Resign (1)", cm.false_negative, cm.true_positive
            )),
            format!("╠{rule}╣"),
            boxed(format!(
                " {:<24} {:>9} {:>7} {:>9} {:>7}",
                "Classification Report", "precision", "recall", "f1-score", "support"
            )),
        ];

        let rows = [
            ("0 (stay)", &self.report.stay),
            ("1 (resign)", &self.report.resign),
            ("macro avg", &self.report.macro_avg),
            ("weighted avg", &self.report.weighted_avg),
        ];
        for (label, m) in rows {
            lines.push(boxed(format!(
                "   {:<22} {:>9.2} {:>7.2} {:>9.2} {:>7}",
                label, m.precision, m.recall, m.f1_score, m.support
            )));
        }
        lines.push(boxed(format!(
            "   {:<22} {:>9} {:>7} {:>9.2} {:>7}",
            "accuracy",
            "",
            "",
            self.report.accuracy,
            self.test_rows()
        )));
        lines.push(format!("╚{rule}╝"));
        lines
    }
}

fn boxed(content: String) -> String {
    format!("║{:<width$}║", content, width = SUMMARY_WIDTH)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_summary_box_is_aligned() {
        let actual = [0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
        let predicted = [0, 0, 0, 0, 1, 1, 1, 1, 1, 0];
        let lines = EvaluationMetrics::evaluate(&actual, &predicted).summary_lines();

        assert_eq!(lines.len(), 18);
        for line in &lines {
            assert_eq!(line.chars().count(), SUMMARY_WIDTH + 2, "{line}");
        }
        assert!(lines[3].contains("Accuracy:  0.70"));
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let actual = [0, 0, 0, 1, 1, 1, 0, 1];
        let predicted = [0, 1, 0, 1, 0, 1, 0, 1];
        let cm = ConfusionMatrix::from_labels(&actual, &predicted);

        assert_eq!(cm.as_array(), [[3, 1], [1, 3]]);
        assert_eq!(cm.total(), actual.len());
    }

    #[test]
    fn test_metrics_consistent_with_matrix() {
        let actual = [0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
        let predicted = [0, 0, 0, 0, 1, 1, 1, 1, 1, 0];
        let metrics = EvaluationMetrics::evaluate(&actual, &predicted);
        let cm = metrics.confusion_matrix;

        assert_abs_diff_eq!(
            metrics.accuracy,
            (cm.true_positive + cm.true_negative) as f64 / cm.total() as f64
        );
        assert_abs_diff_eq!(metrics.precision, 3.0 / 5.0);
        assert_abs_diff_eq!(metrics.recall, 3.0 / 4.0);
        assert_abs_diff_eq!(metrics.f1, 2.0 * 0.6 * 0.75 / 1.35, epsilon = 1e-12);
    }

    #[test]
    fn test_report_rows() {
        let actual = [0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
        let predicted = [0, 0, 0, 0, 1, 1, 1, 1, 1, 0];
        let report = EvaluationMetrics::evaluate(&actual, &predicted).report;

        assert_eq!(report.stay.support, 6);
        assert_eq!(report.resign.support, 4);
        assert_abs_diff_eq!(report.stay.precision, 4.0 / 5.0);
        assert_abs_diff_eq!(report.stay.recall, 4.0 / 6.0);
        assert_abs_diff_eq!(
            report.macro_avg.recall,
            (4.0 / 6.0 + 3.0 / 4.0) / 2.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            report.weighted_avg.recall,
            report.accuracy,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_division_reports_zero() {
        let metrics = EvaluationMetrics::evaluate(&[0, 0, 1], &[0, 0, 0]);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }
}
