/// Index sampling strategies: how a partition is cut into mini-batches
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::Partition;

/// Turns a partition into an ordered sequence of index batches
pub trait IndexSampler {
    /// Every index of `partition` appears in exactly one batch; all batches
    /// hold `batch_size` indices except possibly the last.
    fn sample(&mut self, partition: &Partition, batch_size: usize) -> Vec<Vec<usize>>;
}

/// Random permutation of the partition on every call, then chunked
///
/// Seeded so a run can be replayed exactly.
pub struct RandomSubsetSampler {
    rng: ChaCha8Rng,
}

impl RandomSubsetSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl IndexSampler for RandomSubsetSampler {
    fn sample(&mut self, partition: &Partition, batch_size: usize) -> Vec<Vec<usize>> {
        let mut indices = partition.indices().to_vec();
        indices.shuffle(&mut self.rng);
        chunk(&indices, batch_size)
    }
}

/// Partition order, chunked. Used for the test set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSampler;

impl IndexSampler for SequentialSampler {
    fn sample(&mut self, partition: &Partition, batch_size: usize) -> Vec<Vec<usize>> {
        chunk(partition.indices(), batch_size)
    }
}

fn chunk(indices: &[usize], batch_size: usize) -> Vec<Vec<usize>> {
    indices
        .chunks(batch_size.max(1))
        .map(|c| c.to_vec())
        .collect()
}
