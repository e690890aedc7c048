//! Confidence and per-class score policies for analysis results

use crate::model::{ClassProbabilities, ScoringMode};
use crate::service::classifier::LabelProbability;

/// Placeholder confidence reported for every prediction
pub const PLACEHOLDER_CONFIDENCE: f64 = 85.5;
/// Placeholder score of the predicted class
pub const PLACEHOLDER_PREDICTED: f64 = 0.8;
/// Placeholder score of every other class
pub const PLACEHOLDER_OTHER: f64 = 0.1;

/// Scores attached to a predicted label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
}

/// Fills in `confidence` and `probabilities` for a prediction
pub trait ScoringPolicy: Send + Sync {
    /// Whether the classifier should be asked for per-class probabilities
    fn wants_probabilities(&self) -> bool {
        false
    }

    fn score(&self, label: i64, probabilities: Option<&[LabelProbability]>) -> Scores;
}

/// Synthesized scores that do not come from the model
///
/// The predicted class gets 0.8, the others 0.1, and confidence is always 85.5.
/// Labels outside 0..=2 get 0.1 everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderScoring;

impl ScoringPolicy for PlaceholderScoring {
    fn score(&self, label: i64, _probabilities: Option<&[LabelProbability]>) -> Scores {
        let class_score = |class: i64| {
            if class == label {
                PLACEHOLDER_PREDICTED
            } else {
                PLACEHOLDER_OTHER
            }
        };

        Scores {
            confidence: PLACEHOLDER_CONFIDENCE,
            probabilities: ClassProbabilities {
                class_0: class_score(0),
                class_1: class_score(1),
                class_2: class_score(2),
            },
        }
    }
}

/// Scores taken from the classifier's own probabilities
///
/// Probabilities are matched to `class_0`..`class_2` by label, whatever order
/// the classifier lists them in. Falls back to [`PlaceholderScoring`] unless
/// all three labels are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelScoring;

impl ScoringPolicy for ModelScoring {
    fn wants_probabilities(&self) -> bool {
        true
    }

    fn score(&self, label: i64, probabilities: Option<&[LabelProbability]>) -> Scores {
        let Some(probabilities) = probabilities else {
            return PlaceholderScoring.score(label, None);
        };

        let of = |class: i64| {
            probabilities
                .iter()
                .find(|(l, _)| *l == class)
                .map(|(_, p)| *p)
        };

        match (of(0), of(1), of(2)) {
            (Some(class_0), Some(class_1), Some(class_2)) => {
                let predicted = of(label).unwrap_or_else(|| class_0.max(class_1).max(class_2));

                Scores {
                    confidence: predicted * 100.0,
                    probabilities: ClassProbabilities {
                        class_0,
                        class_1,
                        class_2,
                    },
                }
            }
            _ => PlaceholderScoring.score(label, None),
        }
    }
}

/// Build the policy selected in configuration
pub fn policy_for(mode: ScoringMode) -> Box<dyn ScoringPolicy> {
    match mode {
        ScoringMode::Placeholder => Box::new(PlaceholderScoring),
        ScoringMode::Model => Box::new(ModelScoring),
    }
}
