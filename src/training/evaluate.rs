//! Evaluation metrics for the fitted classifier

use serde::Serialize;

use crate::classifier::RandomForest;
use crate::data::{CLASS_NAMES, N_CLASSES};

use super::TrainingError;

/// Precision/recall/F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub class_name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true examples of the class
    pub support: usize,
}

/// Averaged precision/recall/F1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassReport>,
    pub macro_avg: AverageReport,
    pub weighted_avg: AverageReport,
    /// `confusion_matrix[truth][predicted]`
    pub confusion_matrix: [[usize; N_CLASSES]; N_CLASSES],
}

/// Score `model` against labelled rows. Pure; nothing is logged or stored.
pub fn evaluate<R: AsRef<[f64]>>(
    model: &RandomForest,
    features: &[R],
    target: &[usize],
) -> Result<EvaluationReport, TrainingError> {
    if features.len() != target.len() {
        return Err(TrainingError::LengthMismatch {
            features: features.len(),
            target: target.len(),
        });
    }
    if features.is_empty() {
        return Err(TrainingError::EmptyEvaluation);
    }

    let predicted = model.predict_many(features)?;
    let mut matrix = [[0usize; N_CLASSES]; N_CLASSES];
    for (&truth, &pred) in target.iter().zip(&predicted) {
        if truth >= N_CLASSES || pred >= N_CLASSES {
            return Err(TrainingError::UnknownLabel(truth.max(pred)));
        }
        matrix[truth][pred] += 1;
    }

    Ok(report_from_matrix(matrix))
}

/// Build the full report from a confusion matrix
pub fn report_from_matrix(matrix: [[usize; N_CLASSES]; N_CLASSES]) -> EvaluationReport {
    let total: usize = matrix.iter().flatten().sum();
    let correct: usize = (0..N_CLASSES).map(|k| matrix[k][k]).sum();

    let per_class: Vec<ClassReport> = (0..N_CLASSES)
        .map(|k| {
            let tp = matrix[k][k] as f64;
            let support: usize = matrix[k].iter().sum();
            let predicted: usize = matrix.iter().map(|row| row[k]).sum();
            let precision = ratio(tp, predicted as f64);
            let recall = ratio(tp, support as f64);
            let f1 = ratio(2.0 * precision * recall, precision + recall);
            ClassReport {
                class_name: CLASS_NAMES[k].to_string(),
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    let k = N_CLASSES as f64;
    let macro_avg = AverageReport {
        precision: per_class.iter().map(|c| c.precision).sum::<f64>() / k,
        recall: per_class.iter().map(|c| c.recall).sum::<f64>() / k,
        f1: per_class.iter().map(|c| c.f1).sum::<f64>() / k,
        support: total,
    };

    let weighted = |f: fn(&ClassReport) -> f64| {
        ratio(
            per_class.iter().map(|c| f(c) * c.support as f64).sum(),
            total as f64,
        )
    };
    let weighted_avg = AverageReport {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
        support: total,
    };

    EvaluationReport {
        accuracy: ratio(correct as f64, total as f64),
        per_class,
        macro_avg,
        weighted_avg,
        confusion_matrix: matrix,
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
