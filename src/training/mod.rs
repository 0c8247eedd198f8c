/// Training infrastructure for the feature MLP

pub mod checkpoint;
pub mod loss;
pub mod metrics;
pub mod results;
pub mod scheduler;
pub mod trainer;

pub use checkpoint::{load_metadata, save_checkpoint, CheckpointMetadata};
pub use loss::{binary_cross_entropy_sum, binary_cross_entropy_with_logits_sum, LOG_FLOOR};
pub use metrics::{binarize, compute_f1_score, f1_score, F1Average};
pub use results::TrainingResults;
pub use scheduler::{StepScheduler, StepSchedulerConfig};
pub use trainer::{FeatureNetwork, TestReport, TrainingConfig, ValidationReport};
