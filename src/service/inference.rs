//! Inference service wrapping the loaded classifier
//!
//! Holds the artifact (if it loaded), the normalizer and the scoring policy.
//! Nothing here is mutated after construction, so one instance is shared by
//! every request handler.

use std::sync::Arc;

use crate::model::analysis::SUCCESS_MARKER;
use crate::model::{AnalysisResult, ClassLabel};
use crate::service::classifier::{Classifier, ClassifierError};
use crate::service::normalize::{TextNormalizer, is_whitespace};
use crate::service::scoring::{PlaceholderScoring, ScoringPolicy};

/// Minimum number of characters, after trimming, accepted for analysis
pub const MIN_TEXT_CHARS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Text too short")]
    InputTooShort,

    #[error("{0}")]
    InferenceFailure(String),
}

impl From<ClassifierError> for InferenceError {
    fn from(err: ClassifierError) -> Self {
        InferenceError::InferenceFailure(err.to_string())
    }
}

pub struct InferenceService {
    classifier: Option<Arc<dyn Classifier>>,
    normalizer: TextNormalizer,
    scoring: Box<dyn ScoringPolicy>,
}

impl InferenceService {
    /// Create a service; `None` puts it in the degraded state
    pub fn new(classifier: Option<Arc<dyn Classifier>>, scoring: Box<dyn ScoringPolicy>) -> Self {
        Self {
            classifier,
            normalizer: TextNormalizer::new(),
            scoring,
        }
    }

    /// Service without a model, used when the artifact failed to load
    pub fn degraded() -> Self {
        Self::new(None, Box::new(PlaceholderScoring))
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    fn classifier(&self) -> Result<&Arc<dyn Classifier>, InferenceError> {
        self.classifier
            .as_ref()
            .ok_or(InferenceError::ModelUnavailable)
    }

    /// Fail fast with `ModelUnavailable` before any input is inspected
    pub fn ensure_ready(&self) -> Result<(), InferenceError> {
        self.classifier().map(|_| ())
    }

    /// Classify a raw text
    pub fn analyze(&self, raw_text: &str) -> Result<AnalysisResult, InferenceError> {
        let classifier = self.classifier()?;

        if raw_text.trim_matches(is_whitespace).chars().count() < MIN_TEXT_CHARS {
            return Err(InferenceError::InputTooShort);
        }

        let batch = [self.normalizer.normalize(raw_text)];

        let label = classifier
            .predict(&batch)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                InferenceError::InferenceFailure("classifier returned no prediction".to_string())
            })?;

        let probabilities = if self.scoring.wants_probabilities() {
            classifier
                .predict_proba(&batch)?
                .and_then(|rows| rows.into_iter().next())
        } else {
            None
        };

        let scores = self.scoring.score(label, probabilities.as_deref());

        match ClassLabel::from_index(label) {
            Some(name) => tracing::debug!(class = label, label = %name, "Text classified"),
            None => tracing::warn!(class = label, "Classifier returned an unknown label"),
        }

        Ok(AnalysisResult {
            class: label,
            confidence: scores.confidence,
            probabilities: scores.probabilities,
            test: SUCCESS_MARKER.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::ClassProbabilities;
    use crate::service::classifier::{LabelProbability, LinearTextClassifier};
    use crate::service::scoring::ModelScoring;
    use std::sync::Mutex;

    /// Returns the same label for every input
    pub(crate) struct FixedClassifier(pub i64);

    impl Classifier for FixedClassifier {
        fn predict(&self, batch: &[String]) -> Result<Vec<i64>, ClassifierError> {
            Ok(vec![self.0; batch.len()])
        }
    }

    /// Fails every prediction
    pub(crate) struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _batch: &[String]) -> Result<Vec<i64>, ClassifierError> {
            Err(ClassifierError::Prediction("weights are corrupt".to_string()))
        }
    }

    /// Records what it was asked to classify
    struct RecordingClassifier {
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl Classifier for RecordingClassifier {
        fn predict(&self, batch: &[String]) -> Result<Vec<i64>, ClassifierError> {
            self.seen.lock().unwrap().push(batch.to_vec());
            Ok(vec![2; batch.len()])
        }

        fn predict_proba(
            &self,
            batch: &[String],
        ) -> Result<Option<Vec<Vec<LabelProbability>>>, ClassifierError> {
            Ok(Some(vec![vec![(0, 0.1), (1, 0.2), (2, 0.7)]; batch.len()]))
        }
    }

    pub(crate) fn service_with(classifier: impl Classifier + 'static) -> InferenceService {
        InferenceService::new(Some(Arc::new(classifier)), Box::new(PlaceholderScoring))
    }

    #[test]
    fn test_fixed_label_result() {
        let service = service_with(FixedClassifier(1));
        let result = service.analyze("this is a sufficiently long text").unwrap();

        assert_eq!(result.class, 1);
        assert_eq!(result.confidence, 85.5);
        assert_eq!(
            result.probabilities,
            ClassProbabilities {
                class_0: 0.1,
                class_1: 0.8,
                class_2: 0.1
            }
        );
        assert_eq!(result.test, "API is working!");
    }

    #[test]
    fn test_short_input_rejected() {
        let service = service_with(FixedClassifier(0));
        assert!(matches!(service.analyze(""), Err(InferenceError::InputTooShort)));
        assert!(matches!(service.analyze("   short   "), Err(InferenceError::InputTooShort)));
        // nine characters
        assert!(matches!(service.analyze("123456789"), Err(InferenceError::InputTooShort)));
        assert!(service.analyze("1234567890").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let service = service_with(FixedClassifier(0));
        // five characters, ten bytes
        assert!(matches!(service.analyze("ééééé"), Err(InferenceError::InputTooShort)));
    }

    #[test]
    fn test_ascii_separators_do_not_count_toward_length() {
        let service = service_with(FixedClassifier(0));
        let padded = "\u{1c}\u{1d}short\u{1e}\u{1f}\u{1f}";
        assert!(matches!(service.analyze(padded), Err(InferenceError::InputTooShort)));
    }

    #[test]
    fn test_degraded_service_rejects_everything() {
        let service = InferenceService::degraded();
        assert!(!service.is_model_loaded());
        assert!(matches!(service.ensure_ready(), Err(InferenceError::ModelUnavailable)));
        assert!(matches!(service.analyze(""), Err(InferenceError::ModelUnavailable)));
        assert!(matches!(
            service.analyze("this is a sufficiently long text"),
            Err(InferenceError::ModelUnavailable)
        ));
    }

    #[test]
    fn test_classifier_failure_surfaces_message() {
        let service = service_with(FailingClassifier);
        match service.analyze("this is a sufficiently long text") {
            Err(InferenceError::InferenceFailure(msg)) => {
                assert_eq!(msg, "Prediction failed: weights are corrupt")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_classifier_receives_single_normalized_text() {
        let classifier = Arc::new(RecordingClassifier {
            seen: Mutex::new(Vec::new()),
        });
        let service = InferenceService::new(
            Some(classifier.clone() as Arc<dyn Classifier>),
            Box::new(PlaceholderScoring),
        );

        service.analyze("  Look at http://t.co/x, @Someone!  ").unwrap();

        let seen = classifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec!["look at url user !".to_string()]);
    }

    #[test]
    fn test_model_scoring_reports_classifier_probabilities() {
        let classifier = RecordingClassifier {
            seen: Mutex::new(Vec::new()),
        };
        let service = InferenceService::new(Some(Arc::new(classifier)), Box::new(ModelScoring));

        let result = service.analyze("this is a sufficiently long text").unwrap();
        assert_eq!(result.class, 2);
        assert!((result.confidence - 70.0).abs() < 1e-9);
        assert_eq!(result.probabilities.class_2, 0.7);
    }

    #[test]
    fn test_model_scoring_with_reordered_artifact_classes() {
        let model = LinearTextClassifier::from_json(
            br#"{
                "classes": [2, 1, 0],
                "vocabulary": {"aa": 0},
                "coefficients": [[-1.0], [-1.0], [5.0]],
                "intercepts": [0.0, 0.0, 0.0]
            }"#,
        )
        .unwrap();
        let service = InferenceService::new(Some(Arc::new(model)), Box::new(ModelScoring));

        let result = service.analyze("aa aa aa aa").unwrap();
        assert_eq!(result.class, 0);
        assert!(result.confidence > 99.0);
        assert!(result.probabilities.class_0 > 0.99);
        assert!(result.probabilities.class_2 < 0.01);
    }
}
