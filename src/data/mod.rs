/// Data loading modules for multi-label training
pub mod dataset;
pub mod loader;
pub mod partition;
pub mod sampler;

pub use dataset::{DatasetMetadata, MultiLabelDataset};
pub use loader::MultiLabelLoader;
pub use partition::{split_train_valid, Partition};
pub use sampler::{IndexSampler, RandomSubsetSampler, SequentialSampler};

use candle_core::{Device, Result, Tensor};

/// Generic data loader trait
pub trait BatchDataLoader {
    /// Get next batch of (features, labels) tensors
    fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>>;

    /// Reset loader for new epoch (redraws the batch assignment)
    fn reset(&mut self);

    /// Get total number of batches
    fn num_batches(&self) -> usize;

    /// Number of examples visited per epoch
    fn num_examples(&self) -> usize;
}
