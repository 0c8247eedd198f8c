/// Model checkpointing with safetensors
use std::path::{Path, PathBuf};
use candle_nn::VarMap;

use crate::FeatureMlpConfig;

/// Checkpoint metadata, stored next to the weights as `<weights>.json`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CheckpointMetadata {
    /// Completed epochs
    pub epoch: usize,
    /// Learning rate at checkpoint
    pub lr: f64,
    /// Training loss of the last epoch
    pub loss_train: Option<f64>,
    /// Validation loss of the last epoch
    pub loss_valid: Option<f64>,
    /// Model shape needed to rebuild the network
    pub config: FeatureMlpConfig,
}

/// Path of the JSON sidecar for a weights file
pub fn metadata_path<P: AsRef<Path>>(weights_path: P) -> PathBuf {
    let mut name = weights_path.as_ref().as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Save all parameters to a safetensors file plus a metadata sidecar
///
/// # Arguments
/// * `varmap` - Parameters to save
/// * `path` - Target `.safetensors` path; parent directories are created
/// * `metadata` - Checkpoint metadata
pub fn save_checkpoint<P: AsRef<Path>>(
    varmap: &VarMap,
    path: P,
    metadata: &CheckpointMetadata,
) -> crate::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    varmap.save(path)?;

    let metadata_json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(metadata_path(path), metadata_json.as_bytes())?;

    log::info!("Saved checkpoint to {} (epoch {})", path.display(), metadata.epoch);
    Ok(())
}

/// Load the metadata sidecar of a checkpoint
pub fn load_metadata<P: AsRef<Path>>(weights_path: P) -> crate::Result<CheckpointMetadata> {
    let data = std::fs::read(metadata_path(weights_path))?;
    Ok(serde_json::from_slice(&data)?)
}
