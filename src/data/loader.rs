/// Mini-batch loader over one partition of a shared dataset
use candle_core::{Device, Result, Tensor};
use std::sync::Arc;

use super::{IndexSampler, MultiLabelDataset, Partition, RandomSubsetSampler, SequentialSampler};

/// Data loader yielding `(features, labels)` batches drawn from a partition
///
/// The batch assignment is redrawn from the sampler on every `reset`, so the
/// caller resets once at the start of each epoch.
pub struct MultiLabelLoader {
    dataset: Arc<MultiLabelDataset>,
    partition: Partition,
    sampler: Box<dyn IndexSampler>,
    batch_size: usize,
    batches: Vec<Vec<usize>>,
    current_batch: usize,
}

impl MultiLabelLoader {
    /// Create new data loader
    pub fn new(
        dataset: Arc<MultiLabelDataset>,
        partition: Partition,
        batch_size: usize,
        sampler: Box<dyn IndexSampler>,
    ) -> crate::Result<Self> {
        if batch_size == 0 {
            return Err(crate::MLPError::Config("batch_size must be > 0".to_string()));
        }

        if let Some(max) = partition.max_index() {
            if max >= dataset.len() {
                return Err(crate::MLPError::Data(format!(
                    "partition index {} out of range for dataset of {} examples",
                    max,
                    dataset.len()
                )));
            }
        }

        Ok(Self {
            dataset,
            partition,
            sampler,
            batch_size,
            batches: Vec::new(),
            current_batch: 0,
        })
    }

    /// Loader that reshuffles the partition every epoch
    pub fn random(
        dataset: Arc<MultiLabelDataset>,
        partition: Partition,
        batch_size: usize,
        seed: u64,
    ) -> crate::Result<Self> {
        Self::new(
            dataset,
            partition,
            batch_size,
            Box::new(RandomSubsetSampler::new(seed)),
        )
    }

    /// Loader over the whole dataset in stored order
    pub fn sequential(dataset: Arc<MultiLabelDataset>, batch_size: usize) -> crate::Result<Self> {
        let partition = Partition::range(0, dataset.len());
        Self::new(dataset, partition, batch_size, Box::new(SequentialSampler))
    }

    /// Swap the sampling strategy; takes effect at the next reset
    pub fn set_sampler(&mut self, sampler: Box<dyn IndexSampler>) {
        self.sampler = sampler;
    }

    /// Get next batch (features, labels)
    pub fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>> {
        let Some(indices) = self.batches.get(self.current_batch) else {
            return Ok(None);
        };

        let batch = self.dataset.gather(indices, device)?;
        self.current_batch += 1;

        Ok(Some(batch))
    }

    /// Reset loader for new epoch
    pub fn reset(&mut self) {
        self.batches = self.sampler.sample(&self.partition, self.batch_size);
        self.current_batch = 0;
    }

    /// Get number of batches
    pub fn num_batches(&self) -> usize {
        (self.partition.len() + self.batch_size - 1) / self.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Get dataset reference
    pub fn dataset(&self) -> &Arc<MultiLabelDataset> {
        &self.dataset
    }
}

impl super::BatchDataLoader for MultiLabelLoader {
    fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>> {
        MultiLabelLoader::next_batch(self, device)
    }

    fn reset(&mut self) {
        MultiLabelLoader::reset(self)
    }

    fn num_batches(&self) -> usize {
        MultiLabelLoader::num_batches(self)
    }

    fn num_examples(&self) -> usize {
        self.partition.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dataset(n: usize) -> Arc<MultiLabelDataset> {
        let inputs = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f32);
        let labels = Array2::from_shape_fn((n, 2), |(i, j)| ((i + j) % 2) as f32);
        Arc::new(MultiLabelDataset::new(inputs, labels).unwrap())
    }

    #[test]
    fn test_no_batches_before_reset() -> Result<()> {
        let mut loader = MultiLabelLoader::sequential(dataset(5), 2).unwrap();
        assert!(loader.next_batch(&Device::Cpu)?.is_none());
        Ok(())
    }

    #[test]
    fn test_sequential_epoch() -> Result<()> {
        let mut loader = MultiLabelLoader::sequential(dataset(5), 2).unwrap();
        assert_eq!(loader.num_batches(), 3);

        loader.reset();
        let mut sizes = Vec::new();
        while let Some((x, y)) = loader.next_batch(&Device::Cpu)? {
            assert_eq!(x.dim(1)?, 3);
            assert_eq!(y.dim(1)?, 2);
            sizes.push(x.dim(0)?);
        }
        assert_eq!(sizes, vec![2, 2, 1]);

        // A second epoch yields the same number of batches again
        loader.reset();
        let mut count = 0;
        while loader.next_batch(&Device::Cpu)?.is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        Ok(())
    }

    #[test]
    fn test_random_loader_stays_in_partition() -> Result<()> {
        let ds = dataset(20);
        let mut loader =
            MultiLabelLoader::random(ds, Partition::range(18, 20), 64, 3).unwrap();
        loader.reset();

        let (x, _) = loader.next_batch(&Device::Cpu)?.unwrap();
        assert_eq!(x.dim(0)?, 2);
        let mut firsts: Vec<f32> = x.to_vec2::<f32>()?.iter().map(|r| r[0]).collect();
        firsts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(firsts, vec![54.0, 57.0]);
        assert!(loader.next_batch(&Device::Cpu)?.is_none());
        Ok(())
    }

    #[test]
    fn test_out_of_range_partition_rejected() {
        let result = MultiLabelLoader::new(
            dataset(4),
            Partition::new(vec![0, 4]),
            2,
            Box::new(SequentialSampler),
        );
        assert!(matches!(result, Err(crate::MLPError::Data(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(MultiLabelLoader::sequential(dataset(4), 0).is_err());
    }
}
