/// Multi-label dataset: feature matrix paired with a 0/1 label matrix
use candle_core::{Device, Tensor};
use ndarray::{Array2, ArrayView1};
use ndarray_npy::ReadNpyExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Metadata from dataset.json
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label_names: Vec<String>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// Immutable collection of (features, label-vector) pairs
#[derive(Debug, Clone)]
pub struct MultiLabelDataset {
    inputs: Array2<f32>, // [N, dim_input]
    labels: Array2<f32>, // [N, n_labels], entries 0.0 / 1.0
    metadata: DatasetMetadata,
}

impl MultiLabelDataset {
    /// Pair a feature matrix with a label matrix
    ///
    /// Fails if the row counts differ or if a label is not 0 or 1.
    pub fn new(inputs: Array2<f32>, labels: Array2<f32>) -> crate::Result<Self> {
        if inputs.nrows() != labels.nrows() {
            return Err(crate::MLPError::Shape(format!(
                "inputs have {} rows but labels have {}",
                inputs.nrows(),
                labels.nrows()
            )));
        }

        if let Some(bad) = labels.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(crate::MLPError::Data(format!(
                "label matrix must be binary, found {}",
                bad
            )));
        }

        Ok(Self {
            inputs,
            labels,
            metadata: DatasetMetadata::default(),
        })
    }

    /// Attach text-form label and feature names
    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Load from directory containing inputs.npy, labels.npy and optional dataset.json
    pub fn from_directory<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let dir = path.as_ref();

        log::info!("Loading multi-label dataset from: {:?}", dir);

        let metadata_path = dir.join("dataset.json");
        let metadata: DatasetMetadata = if metadata_path.exists() {
            let reader = BufReader::new(File::open(&metadata_path)?);
            serde_json::from_reader(reader)?
        } else {
            log::warn!("dataset.json not found, dataset has no label names");
            DatasetMetadata::default()
        };

        let inputs = read_matrix(&dir.join("inputs.npy"))?;
        log::info!("Loaded inputs: shape {:?}", inputs.shape());

        let labels = read_matrix(&dir.join("labels.npy"))?;
        log::info!("Loaded labels: shape {:?}", labels.shape());

        let dataset = Self::new(inputs, labels)?.with_metadata(metadata);

        log::info!(
            "Dataset loaded: {} examples, dim_input={}, n_labels={}",
            dataset.len(),
            dataset.dim_input(),
            dataset.n_labels()
        );

        Ok(dataset)
    }

    /// Get number of examples
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inputs.nrows() == 0
    }

    pub fn dim_input(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn n_labels(&self) -> usize {
        self.labels.ncols()
    }

    pub fn inputs(&self) -> &Array2<f32> {
        &self.inputs
    }

    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Get the (features, labels) pair at index
    pub fn get(&self, idx: usize) -> (ArrayView1<f32>, ArrayView1<f32>) {
        (self.inputs.row(idx), self.labels.row(idx))
    }

    /// Stack the given rows into `[B, dim_input]` and `[B, n_labels]` tensors
    pub fn gather(
        &self,
        indices: &[usize],
        device: &Device,
    ) -> candle_core::Result<(Tensor, Tensor)> {
        let mut input_data = Vec::with_capacity(indices.len() * self.dim_input());
        let mut label_data = Vec::with_capacity(indices.len() * self.n_labels());

        for &idx in indices {
            let (input, label) = self.get(idx);
            input_data.extend(input.iter().copied());
            label_data.extend(label.iter().copied());
        }

        let inputs = Tensor::from_vec(input_data, (indices.len(), self.dim_input()), device)?;
        let labels = Tensor::from_vec(label_data, (indices.len(), self.n_labels()), device)?;

        Ok((inputs, labels))
    }
}

/// Read a 2-D .npy array of any common numeric dtype as f32
fn read_matrix(path: &Path) -> crate::Result<Array2<f32>> {
    if let Ok(m) = <Array2<f32> as ReadNpyExt>::read_npy(File::open(path)?) {
        return Ok(m);
    }
    if let Ok(m) = <Array2<f64> as ReadNpyExt>::read_npy(File::open(path)?) {
        return Ok(m.mapv(|x| x as f32));
    }
    if let Ok(m) = <Array2<i64> as ReadNpyExt>::read_npy(File::open(path)?) {
        return Ok(m.mapv(|x| x as f32));
    }
    if let Ok(m) = <Array2<i32> as ReadNpyExt>::read_npy(File::open(path)?) {
        return Ok(m.mapv(|x| x as f32));
    }

    <Array2<u8> as ReadNpyExt>::read_npy(File::open(path)?)
        .map(|m| m.mapv(f32::from))
        .map_err(|e| crate::MLPError::Npy(format!("Failed to read {}: {}", path.display(), e)))
}
