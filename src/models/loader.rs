/// Weight loading from safetensors files
use std::path::Path;
use candle_core::{Device, DType};
use candle_nn::VarBuilder;
use crate::FeatureMlpConfig;
use super::FeatureMlp;

/// Load model from safetensors file
///
/// # Arguments
/// * `config` - Model configuration (must match the stored shapes)
/// * `weights_path` - Path to safetensors file
/// * `device` - Device to load model on
///
/// # Returns
/// Loaded FeatureMlp, in evaluation mode
pub fn load_model<P: AsRef<Path>>(
    config: FeatureMlpConfig,
    weights_path: P,
    device: &Device,
) -> crate::Result<FeatureMlp> {
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path.as_ref()], DType::F32, device)?
    };

    let mut model = FeatureMlp::new(config, vb)?;
    model.eval();
    Ok(model)
}
