pub mod classifier;
pub mod inference;
pub mod normalize;
pub mod scoring;

pub use classifier::{Classifier, LinearTextClassifier};
pub use inference::{InferenceError, InferenceService};
