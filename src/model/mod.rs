pub mod analysis;
pub mod config;

pub use analysis::{
    AnalysisRequest, AnalysisResult, ClassLabel, ClassProbabilities, RequestError,
};
pub use config::{Config, ScoringMode};
