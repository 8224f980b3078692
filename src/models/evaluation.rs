//! Held-out evaluation of a model against labelled claims

use crate::types::Threshold;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Classification metrics for one model on a labelled set.
///
/// Ratios whose denominator is zero are reported as 0. `roc_auc` is absent
/// when the set holds only one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model: String,
    pub model_version: String,
    pub threshold: f64,
    pub samples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: Option<f64>,
    /// `[[tn, fp], [fn, tp]]`: rows are the actual class, columns the predicted one
    pub confusion_matrix: [[u64; 2]; 2],
}

impl EvaluationReport {
    /// Build the report from `(probability, is_fraud)` pairs.
    pub fn from_scores(
        model: &str,
        model_version: &str,
        threshold: Threshold,
        scores: &[(f64, bool)],
    ) -> Self {
        let mut matrix = [[0u64; 2]; 2];
        for (probability, actual) in scores {
            let predicted = threshold.classify(*probability).is_fraud();
            matrix[*actual as usize][predicted as usize] += 1;
        }

        let [[tn, fp], [fn_, tp]] = matrix;
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            model: model.to_string(),
            model_version: model_version.to_string(),
            threshold: threshold.value(),
            samples: scores.len(),
            accuracy: ratio(tp + tn, scores.len() as u64),
            precision,
            recall,
            f1,
            roc_auc: roc_auc(scores),
            confusion_matrix: matrix,
        }
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;

        info!(path = %path.display(), samples = self.samples, "Evaluation report written");
        Ok(())
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Area under the ROC curve via the rank-sum statistic, ties sharing their
/// average rank.
fn roc_auc(scores: &[(f64, bool)]) -> Option<f64> {
    let positives = scores.iter().filter(|(_, actual)| *actual).count();
    let negatives = scores.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted: Vec<&(f64, bool)> = scores.iter().collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].0 == sorted[start].0 {
            end += 1;
        }

        // Ranks are 1-based; a tied run shares the mean of its ranks
        let rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = sorted[start..=end].iter().filter(|(_, actual)| *actual).count();
        positive_rank_sum += rank * tied_positives as f64;

        start = end + 1;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}
