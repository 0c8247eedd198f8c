/// Fixed train/validation partitioning of a dataset's index range

/// A set of indices into a dataset, in the order they were assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    indices: Vec<usize>,
}

impl Partition {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Contiguous range `start..end`
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            indices: (start..end).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }
}

/// Split `0..n` into a training prefix of `floor(train_fraction * n)` indices
/// and a validation suffix holding the rest. Indices are never shuffled.
pub fn split_train_valid(n: usize, train_fraction: f64) -> crate::Result<(Partition, Partition)> {
    if !(train_fraction > 0.0 && train_fraction <= 1.0) {
        return Err(crate::MLPError::Config(format!(
            "train_fraction must be in (0, 1], got {}",
            train_fraction
        )));
    }

    let n_train = ((n as f64) * train_fraction).floor() as usize;
    let n_train = n_train.min(n);

    Ok((Partition::range(0, n_train), Partition::range(n_train, n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_and_cover() {
        for n in [0usize, 1, 9, 10, 11, 100, 101, 4880, 7395] {
            let (train, valid) = split_train_valid(n, 0.9).unwrap();
            assert_eq!(train.len() + valid.len(), n);
            assert_eq!(train.len(), ((n as f64) * 0.9).floor() as usize);

            let t: HashSet<usize> = train.indices().iter().copied().collect();
            let v: HashSet<usize> = valid.indices().iter().copied().collect();
            assert!(t.is_disjoint(&v));
            let all: HashSet<usize> = t.union(&v).copied().collect();
            assert_eq!(all, (0..n).collect::<HashSet<_>>());
        }
    }

    #[test]
    fn test_split_is_ordered_prefix() {
        let (train, valid) = split_train_valid(100, 0.9).unwrap();
        assert_eq!(train.indices(), (0..90).collect::<Vec<_>>().as_slice());
        assert_eq!(valid.indices(), (90..100).collect::<Vec<_>>().as_slice());
        assert_eq!(valid.max_index(), Some(99));
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(
            split_train_valid(537, 0.9).unwrap(),
            split_train_valid(537, 0.9).unwrap()
        );
    }

    #[test]
    fn test_bad_fraction_rejected() {
        assert!(split_train_valid(10, 0.0).is_err());
        assert!(split_train_valid(10, 1.5).is_err());
        assert!(split_train_valid(10, f64::NAN).is_err());
    }
}
