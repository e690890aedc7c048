//! Classifier artifact loading and prediction
//!
//! The artifact is a TF-IDF bag-of-words linear model serialized as JSON:
//!
//! ```json
//! {
//!   "classes": [0, 1, 2],
//!   "vocabulary": {"hate": 0, "love": 1},
//!   "idf": [1.5, 1.2],
//!   "coefficients": [[2.0, -1.0], [0.5, 0.0], [-1.0, 2.0]],
//!   "intercepts": [0.0, 0.1, 0.2]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Probability assigned to one class label
pub type LabelProbability = (i64, f64);

/// A loaded text classifier
///
/// Implementations are immutable once constructed and shared across request
/// handlers behind an `Arc`.
pub trait Classifier: Send + Sync {
    /// Predict one label per input text
    fn predict(&self, batch: &[String]) -> Result<Vec<i64>, ClassifierError>;

    /// Per-class probabilities for each input as `(label, probability)` pairs
    ///
    /// Returns `None` when the classifier cannot produce them.
    fn predict_proba(
        &self,
        _batch: &[String],
    ) -> Result<Option<Vec<Vec<LabelProbability>>>, ClassifierError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct LinearModelFile {
    classes: Vec<i64>,
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

fn default_lowercase() -> bool {
    true
}

/// TF-IDF weighted linear classifier
#[derive(Debug)]
pub struct LinearTextClassifier {
    classes: Vec<i64>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
}

impl LinearTextClassifier {
    /// Load and validate an artifact from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents)
    }

    /// Build a classifier from serialized artifact bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let file: LinearModelFile = serde_json::from_slice(bytes)?;
        Self::from_parts(file)
    }

    fn from_parts(file: LinearModelFile) -> Result<Self, ArtifactError> {
        let n_classes = file.classes.len();
        let n_features = file.vocabulary.len();

        if n_classes == 0 {
            return Err(ArtifactError::Invalid("no classes defined".to_string()));
        }
        if file.coefficients.len() != n_classes {
            return Err(ArtifactError::Invalid(format!(
                "expected {} coefficient rows, found {}",
                n_classes,
                file.coefficients.len()
            )));
        }
        if file.intercepts.len() != n_classes {
            return Err(ArtifactError::Invalid(format!(
                "expected {} intercepts, found {}",
                n_classes,
                file.intercepts.len()
            )));
        }
        if let Some(row) = file.coefficients.iter().position(|r| r.len() != n_features) {
            return Err(ArtifactError::Invalid(format!(
                "coefficient row {} has {} columns, vocabulary has {} terms",
                row,
                file.coefficients[row].len(),
                n_features
            )));
        }
        if let Some((term, index)) = file.vocabulary.iter().find(|(_, i)| **i >= n_features) {
            return Err(ArtifactError::Invalid(format!(
                "vocabulary term {:?} has out of range index {}",
                term, index
            )));
        }

        let idf = match file.idf {
            Some(idf) if idf.len() != n_features => {
                return Err(ArtifactError::Invalid(format!(
                    "idf has {} entries, vocabulary has {} terms",
                    idf.len(),
                    n_features
                )));
            }
            Some(idf) => idf,
            None => vec![1.0; n_features],
        };

        Ok(Self {
            classes: file.classes,
            vocabulary: file.vocabulary,
            idf,
            coefficients: file.coefficients,
            intercepts: file.intercepts,
            lowercase: file.lowercase,
            token_pattern: Regex::new(r"\b\w\w+\b").expect("token pattern is valid"),
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// L2-normalized TF-IDF vector, indexed like the vocabulary
    ///
    /// Dense so every sum runs in index order and repeated calls agree bit for bit.
    fn features(&self, text: &str) -> Vec<f64> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut features = vec![0.0; self.vocabulary.len()];
        for token in self.token_pattern.find_iter(&text) {
            if let Some(&index) = self.vocabulary.get(token.as_str()) {
                features[index] += 1.0;
            }
        }

        for (value, idf) in features.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = features.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in features.iter_mut() {
                *value /= norm;
            }
        }

        features
    }

    /// Raw per-class decision values
    fn decision(&self, text: &str) -> Vec<f64> {
        let features = self.features(text);

        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                row.iter()
                    .zip(&features)
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

impl Classifier for LinearTextClassifier {
    fn predict(&self, batch: &[String]) -> Result<Vec<i64>, ClassifierError> {
        batch
            .iter()
            .map(|text| {
                let scores = self.decision(text);
                let best = argmax(&scores).ok_or_else(|| {
                    ClassifierError::Prediction("model produced no decision values".to_string())
                })?;
                Ok(self.classes[best])
            })
            .collect()
    }

    fn predict_proba(
        &self,
        batch: &[String],
    ) -> Result<Option<Vec<Vec<LabelProbability>>>, ClassifierError> {
        let probabilities: Vec<Vec<LabelProbability>> = batch
            .iter()
            .map(|text| {
                self.classes
                    .iter()
                    .copied()
                    .zip(softmax(&self.decision(text)))
                    .collect()
            })
            .collect();

        Ok(Some(probabilities))
    }
}

/// Index of the largest value; the first one wins ties
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
