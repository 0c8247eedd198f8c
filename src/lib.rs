//! Multi-label MLP - feature network for multi-label classification
//!
//! A small feed-forward network trained with independent per-label sigmoid
//! outputs and a summed binary cross-entropy loss. Once trained, the same
//! network can be switched into feature-extraction mode and used as the
//! input encoder of a structured-prediction model.
//!
//! # Architecture
//!
//! - **FeatureMlp**: `dim_input -> hidden -> hidden -> n_labels` with ReLU
//!   activations and a sigmoid head
//! - **FeatureNetwork**: training loop controller (train / validate / test)
//! - **Data**: dataset adapter, fixed 90/10 partitioner, pluggable index samplers
//!
//! # Example
//!
//! ```ignore
//! use multilabel_mlp::{FeatureNetwork, MultiLabelDataset};
//! use multilabel_mlp::training::{StepScheduler, TrainingConfig};
//!
//! let dataset = MultiLabelDataset::from_directory("data/bibtex/train")?;
//! let config = TrainingConfig::default();
//! let mut net = FeatureNetwork::new(dataset, config.clone(), Device::Cpu)?;
//! let mut scheduler = StepScheduler::from_config(&config);
//! let results = net.fit(10, &mut scheduler)?;
//! ```

pub mod config;
pub mod data;
pub mod layers;
pub mod models;
pub mod training;
pub mod utils;

// Re-export commonly used items
pub use config::FeatureMlpConfig;
pub use data::{MultiLabelDataset, MultiLabelLoader, Partition};
pub use models::FeatureMlp;
pub use training::{FeatureNetwork, TrainingResults};

/// Library error types
#[derive(Debug, thiserror::Error)]
pub enum MLPError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NumPy error: {0}")]
    Npy(String),
}

pub type Result<T> = std::result::Result<T, MLPError>;
