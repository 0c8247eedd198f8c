/// Fully connected layer with a fixed activation
use candle_core::{Module, Result, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Elementwise activation applied after the affine map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, x: &Tensor) -> Result<Tensor> {
        match self {
            Activation::Relu => x.relu(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(x),
        }
    }
}

/// Linear layer followed by an activation
///
/// Parameters live under `weight` `[out_features, in_features]` and
/// `bias` `[out_features]` in the given VarBuilder prefix.
pub struct Dense {
    linear: Linear,
    activation: Activation,
}

impl Dense {
    /// Create new Dense layer
    ///
    /// # Arguments
    /// * `in_features` - Input dimension
    /// * `out_features` - Output dimension
    /// * `activation` - Activation applied to the affine output
    /// * `vb` - VarBuilder for parameter initialization
    pub fn new(
        in_features: usize,
        out_features: usize,
        activation: Activation,
        vb: VarBuilder,
    ) -> Result<Self> {
        let linear = linear(in_features, out_features, vb)?;
        Ok(Self { linear, activation })
    }

    /// Affine output before the activation
    pub fn pre_activation(&self, x: &Tensor) -> Result<Tensor> {
        self.linear.forward(x)
    }
}

impl Module for Dense {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let z = self.pre_activation(x)?;
        self.activation.apply(&z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_dense_shape() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let dense = Dense::new(64, 16, Activation::Relu, vb)?;

        let x = Tensor::randn(0f32, 1.0, (8, 64), &device)?;
        let out = dense.forward(&x)?;

        assert_eq!(out.dims(), &[8, 16]);
        Ok(())
    }

    #[test]
    fn test_relu_non_negative() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let dense = Dense::new(32, 32, Activation::Relu, vb)?;
        let x = Tensor::randn(0f32, 1.0, (4, 32), &device)?;
        let min = dense.forward(&x)?.min_all()?.to_scalar::<f32>()?;
        assert!(min >= 0.0);
        Ok(())
    }

    #[test]
    fn test_sigmoid_range() -> Result<()> {
        let device = Device::Cpu;
        let x = Tensor::new(&[[-30f32, -1.0, 0.0, 1.0, 30.0]], &device)?;
        let y = Activation::Sigmoid.apply(&x)?.to_vec2::<f32>()?;
        assert!(y[0].iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!((y[0][2] - 0.5).abs() < 1e-6);
        Ok(())
    }
}
