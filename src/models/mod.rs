/// Feature MLP: the predictor network
use candle_core::{Device, Module, Result, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::FeatureMlpConfig;
use crate::layers::{Activation, Dense};

pub mod loader;

/// Two-hidden-layer perceptron mapping x -> F(x)
///
/// - fc1: `dim_input -> n_hidden_units`, ReLU
/// - fc2: `n_hidden_units -> n_hidden_units`, ReLU
/// - fc3: `n_hidden_units -> n_labels`, sigmoid (skipped in feature extraction mode)
///
/// Each label gets an independent probability. Once trained, the network is
/// used up to fc2 as a feature extractor for structured-prediction models.
pub struct FeatureMlp {
    config: FeatureMlpConfig,
    fc1: Dense,
    fc2: Dense,
    fc3: Dense,
    training: bool,
}

impl FeatureMlp {
    /// Create new model
    ///
    /// All three layers are always allocated; the extraction flag only
    /// changes what `forward` returns.
    pub fn new(config: FeatureMlpConfig, vb: VarBuilder) -> crate::Result<Self> {
        config.validate()?;

        let fc1 = Dense::new(
            config.dim_input,
            config.n_hidden_units,
            Activation::Relu,
            vb.pp("fc1"),
        )?;
        let fc2 = Dense::new(
            config.n_hidden_units,
            config.n_hidden_units,
            Activation::Relu,
            vb.pp("fc2"),
        )?;
        let fc3 = Dense::new(
            config.n_hidden_units,
            config.n_labels,
            Activation::Sigmoid,
            vb.pp("fc3"),
        )?;

        Ok(Self {
            config,
            fc1,
            fc2,
            fc3,
            training: true,
        })
    }

    /// Hidden representation after fc2
    pub fn hidden(&self, x: &Tensor) -> Result<Tensor> {
        let h = self.fc1.forward(x)?;
        self.fc2.forward(&h)
    }

    /// Pre-sigmoid label scores
    pub fn logits(&self, x: &Tensor) -> Result<Tensor> {
        let h = self.hidden(x)?;
        self.fc3.pre_activation(&h)
    }

    pub fn config(&self) -> &FeatureMlpConfig {
        &self.config
    }

    pub fn only_feature_extraction(&self) -> bool {
        self.config.only_feature_extraction
    }

    pub fn set_only_feature_extraction(&mut self, enabled: bool) {
        self.config.only_feature_extraction = enabled;
    }

    /// Switch to training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Switch to evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }
}

impl Module for FeatureMlp {
    /// `[B, dim_input]` -> `[B, n_labels]` probabilities, or `[B, n_hidden_units]`
    /// features when only_feature_extraction is set
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let h = self.hidden(x)?;
        if self.config.only_feature_extraction {
            return Ok(h);
        }
        self.fc3.forward(&h)
    }
}

/// Fill `varmap` with seeded initial parameters for every layer
///
/// Weights and biases are drawn from U(-1/sqrt(fan_in), 1/sqrt(fan_in)).
/// Must run before `FeatureMlp::new` so the VarBuilder picks them up.
pub fn init_params(
    varmap: &VarMap,
    config: &FeatureMlpConfig,
    seed: u64,
    device: &Device,
) -> crate::Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let hidden = config.n_hidden_units;
    let layers = [
        ("fc1", config.dim_input, hidden),
        ("fc2", hidden, hidden),
        ("fc3", hidden, config.n_labels),
    ];

    let mut data = varmap
        .data()
        .lock()
        .map_err(|_| crate::MLPError::Model("parameter map lock poisoned".to_string()))?;

    for (name, fan_in, fan_out) in layers {
        let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);

        let weight: Vec<f32> = (0..fan_in * fan_out).map(|_| dist.sample(&mut rng)).collect();
        let bias: Vec<f32> = (0..fan_out).map(|_| dist.sample(&mut rng)).collect();

        let weight = Tensor::from_vec(weight, (fan_out, fan_in), device)?;
        let bias = Tensor::from_vec(bias, fan_out, device)?;

        data.insert(format!("{}.weight", name), Var::from_tensor(&weight)?);
        data.insert(format!("{}.bias", name), Var::from_tensor(&bias)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;

    fn build(config: FeatureMlpConfig, seed: u64) -> crate::Result<(VarMap, FeatureMlp)> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        init_params(&varmap, &config, seed, &device)?;
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = FeatureMlp::new(config, vb)?;
        Ok((varmap, model))
    }

    #[test]
    fn test_output_shapes() -> crate::Result<()> {
        let (_varmap, mut model) = build(FeatureMlpConfig::new(20, 5).with_hidden_units(12), 0)?;
        let x = Tensor::randn(0f32, 1.0, (3, 20), &Device::Cpu)?;

        assert_eq!(model.forward(&x)?.dims(), &[3, 5]);

        model.set_only_feature_extraction(true);
        assert_eq!(model.forward(&x)?.dims(), &[3, 12]);
        Ok(())
    }

    #[test]
    fn test_probabilities_in_unit_interval() -> crate::Result<()> {
        let (_varmap, model) = build(FeatureMlpConfig::new(10, 7).with_hidden_units(8), 1)?;
        let x = Tensor::randn(0f32, 3.0, (16, 10), &Device::Cpu)?;
        let y = model.forward(&x)?;
        let min = y.min_all()?.to_scalar::<f32>()?;
        let max = y.max_all()?.to_scalar::<f32>()?;
        assert!(min >= 0.0 && max <= 1.0);
        Ok(())
    }

    #[test]
    fn test_predict_is_idempotent() -> crate::Result<()> {
        let (_varmap, model) = build(FeatureMlpConfig::new(10, 4).with_hidden_units(8), 2)?;
        let x = Tensor::randn(0f32, 1.0, (5, 10), &Device::Cpu)?;
        let a = model.forward(&x)?.to_vec2::<f32>()?;
        let b = model.forward(&x)?.to_vec2::<f32>()?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_feature_mode_shares_first_two_layers() -> crate::Result<()> {
        let (_varmap, mut model) = build(FeatureMlpConfig::new(10, 4).with_hidden_units(6), 3)?;
        let x = Tensor::randn(0f32, 1.0, (5, 10), &Device::Cpu)?;

        let hidden = model.hidden(&x)?.to_vec2::<f32>()?;
        let probs = model.forward(&x)?;

        model.set_only_feature_extraction(true);
        let features = model.forward(&x)?.to_vec2::<f32>()?;
        assert_eq!(features, hidden);

        // Classification output is sigmoid(fc3(features))
        model.set_only_feature_extraction(false);
        let recomputed = candle_nn::ops::sigmoid(&model.logits(&x)?)?;
        let diff = (probs - recomputed)?.abs()?.max_all()?.to_scalar::<f32>()?;
        assert!(diff < 1e-6);
        Ok(())
    }

    #[test]
    fn test_seeded_init_is_reproducible() -> crate::Result<()> {
        let config = FeatureMlpConfig::new(10, 4).with_hidden_units(8);
        let (_a_map, a) = build(config.clone(), 11)?;
        let (_b_map, b) = build(config, 11)?;
        let x = Tensor::randn(0f32, 1.0, (5, 10), &Device::Cpu)?;
        assert_eq!(a.forward(&x)?.to_vec2::<f32>()?, b.forward(&x)?.to_vec2::<f32>()?);
        Ok(())
    }

    #[test]
    fn test_init_bounds_and_names() -> crate::Result<()> {
        let config = FeatureMlpConfig::new(16, 3).with_hidden_units(4);
        let (varmap, _model) = build(config, 5)?;
        let vars = varmap.data().lock().unwrap();
        assert_eq!(vars.len(), 6);

        let w1 = vars["fc1.weight"].as_tensor();
        assert_eq!(w1.dims(), &[4, 16]);
        let max = w1.abs()?.max_all()?.to_scalar::<f32>()?;
        assert!(max <= 0.25 + 1e-6);
        assert_eq!(vars["fc3.bias"].as_tensor().dims(), &[3]);
        Ok(())
    }

    #[test]
    fn test_mode_flags() -> crate::Result<()> {
        let (_varmap, mut model) = build(FeatureMlpConfig::new(4, 2).with_hidden_units(3), 0)?;
        assert!(model.is_training());
        model.eval();
        assert!(!model.is_training());
        model.train();
        assert!(model.is_training());
        Ok(())
    }
}
