/// Utility functions for device placement and model inspection
use candle_core::{Device, Tensor};

/// Resolve the compute device for a run
///
/// Requesting CUDA on a machine without it is a construction-time error;
/// there is no silent fallback to the CPU.
pub fn select_device(use_cuda: bool) -> crate::Result<Device> {
    if !use_cuda {
        return Ok(Device::Cpu);
    }

    if !candle_core::utils::cuda_is_available() {
        return Err(crate::MLPError::Config(
            "CUDA requested but not available".to_string(),
        ));
    }

    Ok(Device::new_cuda(0)?)
}

/// Calculate the number of parameters in a tensor
pub fn count_parameters(tensor: &Tensor) -> usize {
    tensor.dims().iter().product()
}
