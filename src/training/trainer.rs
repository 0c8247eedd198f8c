/// Training loop for the feature MLP
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use ndarray::{Array2, ArrayView2, Axis};
use std::path::Path;
use std::sync::Arc;

use super::checkpoint::{save_checkpoint, CheckpointMetadata};
use super::loss::binary_cross_entropy_with_logits_sum;
use super::metrics::{binarize, compute_f1_score};
use super::results::TrainingResults;
use super::scheduler::StepScheduler;
use crate::data::{split_train_valid, BatchDataLoader, IndexSampler, MultiLabelDataset, MultiLabelLoader};
use crate::models::{init_params, FeatureMlp};
use crate::utils::count_parameters;
use crate::{FeatureMlpConfig, MLPError, Result};

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Training batch size
    pub batch_size: usize,
    /// Validation / test batch size
    pub batch_size_eval: usize,
    /// Initial Adam learning rate
    pub learning_rate: f64,
    /// Share of the dataset (leading rows) used for training
    pub train_fraction: f64,
    /// Report running loss every N batches
    pub log_every: usize,
    /// Epochs between learning rate decays
    pub lr_step_size: usize,
    /// Learning rate decay factor
    pub lr_gamma: f64,
    /// Seed for parameter init and batch sampling
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            batch_size_eval: 64,
            learning_rate: 1e-3,
            train_fraction: 0.9,
            log_every: 10,
            lr_step_size: 25,
            lr_gamma: 0.1,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size_eval == 0 {
            return Err(MLPError::Config("batch sizes must be > 0".to_string()));
        }

        if self.log_every == 0 {
            return Err(MLPError::Config("log_every must be > 0".to_string()));
        }

        if self.lr_step_size == 0 {
            return Err(MLPError::Config("lr_step_size must be > 0".to_string()));
        }

        if !(self.learning_rate > 0.0) {
            return Err(MLPError::Config(format!(
                "learning_rate must be > 0, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }
}

/// Outcome of one pass over the validation partition
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Summed BCE divided by the number of validation examples
    pub loss: f64,
    /// Mean of the per-batch F1 scores
    pub mean_f1: f64,
    /// F1 of each validation batch, in visiting order
    pub batch_f1: Vec<f64>,
}

/// Outcome of a pass over an external test set
#[derive(Debug, Clone)]
pub struct TestReport {
    /// Summed BCE divided by the number of test examples
    pub loss: f64,
    /// F1 over the concatenated predictions of the whole test set
    pub f1: f64,
    /// Binarized predictions, one row per test example in loader order
    pub predictions: Array2<u8>,
}

/// Feature network: owns the model, its optimizer and the train/valid loaders
///
/// Validation reports the mean of per-batch F1 scores, while `test` scores
/// the whole concatenated prediction matrix once. The two numbers are not
/// interchangeable: with a partial last batch the batch mean weights those
/// few examples more heavily.
pub struct FeatureNetwork {
    model: FeatureMlp,
    varmap: VarMap,
    optimizer: AdamW,
    train_loader: MultiLabelLoader,
    valid_loader: MultiLabelLoader,
    config: TrainingConfig,
    device: Device,
    epochs_completed: usize,
    last_losses: Option<(f64, f64)>,
}

impl FeatureNetwork {
    /// Create new feature network with the default hidden width
    pub fn new(dataset: MultiLabelDataset, config: TrainingConfig, device: Device) -> Result<Self> {
        let model_config = FeatureMlpConfig::new(dataset.dim_input(), dataset.n_labels());
        Self::with_model_config(dataset, model_config, config, device)
    }

    /// Create new feature network with an explicit model configuration
    pub fn with_model_config(
        dataset: MultiLabelDataset,
        model_config: FeatureMlpConfig,
        config: TrainingConfig,
        device: Device,
    ) -> Result<Self> {
        config.validate()?;
        model_config.validate()?;

        if model_config.dim_input != dataset.dim_input() || model_config.n_labels != dataset.n_labels() {
            return Err(MLPError::Shape(format!(
                "model expects ({}, {}) but dataset has dim_input={} n_labels={}",
                model_config.dim_input,
                model_config.n_labels,
                dataset.dim_input(),
                dataset.n_labels()
            )));
        }

        let (train_part, valid_part) = split_train_valid(dataset.len(), config.train_fraction)?;
        if train_part.is_empty() || valid_part.is_empty() {
            return Err(MLPError::Config(format!(
                "dataset of {} examples is too small for a {} train split",
                dataset.len(),
                config.train_fraction
            )));
        }

        log::info!(
            "Partition: {} train / {} valid examples (dim_input={}, n_labels={})",
            train_part.len(),
            valid_part.len(),
            dataset.dim_input(),
            dataset.n_labels()
        );

        let dataset = Arc::new(dataset);
        let train_loader = MultiLabelLoader::random(
            Arc::clone(&dataset),
            train_part,
            config.batch_size,
            config.seed,
        )?;
        let valid_loader = MultiLabelLoader::random(
            dataset,
            valid_part,
            config.batch_size_eval,
            config.seed.wrapping_add(1),
        )?;

        let varmap = VarMap::new();
        init_params(&varmap, &model_config, config.seed, &device)?;
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = FeatureMlp::new(model_config.clone(), vb)?;

        log::info!(
            "Model: {} -> {} -> {} -> {} ({} parameters)",
            model_config.dim_input,
            model_config.n_hidden_units,
            model_config.n_hidden_units,
            model_config.n_labels,
            varmap.all_vars().iter().map(|v| count_parameters(v.as_tensor())).sum::<usize>()
        );

        // Adam: decoupled weight decay disabled
        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                beta1: 0.9,
                beta2: 0.999,
                eps: 1e-8,
                weight_decay: 0.0,
            },
        )?;

        Ok(Self {
            model,
            varmap,
            optimizer,
            train_loader,
            valid_loader,
            config,
            device,
            epochs_completed: 0,
            last_losses: None,
        })
    }

    /// Replace the index samplers of the train and valid loaders
    pub fn set_samplers(&mut self, train: Box<dyn IndexSampler>, valid: Box<dyn IndexSampler>) {
        self.train_loader.set_sampler(train);
        self.valid_loader.set_sampler(valid);
    }

    /// Train for one epoch, returning the per-example average loss
    pub fn train_epoch(&mut self, epoch: usize) -> Result<f64> {
        if self.model.only_feature_extraction() {
            return Err(MLPError::Training(
                "cannot train while in feature extraction mode".to_string(),
            ));
        }

        self.model.train();
        self.train_loader.reset();

        let n_train = self.train_loader.partition().len();
        let mut t_loss = 0.0f64;
        let mut t_size = 0usize;
        let mut batch_idx = 0usize;

        while let Some((inputs, targets)) = self.train_loader.next_batch(&self.device)? {
            t_size += inputs.dim(0)?;

            let logits = self.model.logits(&inputs)?;
            let loss = binary_cross_entropy_with_logits_sum(&logits, &targets)?;
            let batch_loss = loss.to_scalar::<f32>()? as f64;
            t_loss += batch_loss;
            log::debug!("epoch {} batch {}: loss sum {:.5}", epoch, batch_idx, batch_loss);

            // Gradients are recomputed from scratch on every backward pass
            self.optimizer.backward_step(&loss)?;

            if batch_idx % self.config.log_every == 0 {
                log::info!(
                    "Training Epoch {} [{} / {} ({:.0}%)]: Avg_Loss = {:.5}",
                    epoch,
                    t_size,
                    n_train,
                    100.0 * t_size as f64 / n_train as f64,
                    t_loss / t_size as f64
                );
            }
            batch_idx += 1;
        }

        Ok(t_loss / t_size as f64)
    }

    /// Loss and mean per-batch F1 over the validation partition
    pub fn validate(&mut self) -> Result<ValidationReport> {
        self.model.eval();
        self.valid_loader.reset();

        let mut loss = 0.0f64;
        let mut t_size = 0usize;
        let mut batch_f1 = Vec::with_capacity(self.valid_loader.num_batches());

        while let Some((inputs, targets)) = self.valid_loader.next_batch(&self.device)? {
            t_size += inputs.dim(0)?;

            let logits = self.model.logits(&inputs)?;
            loss += binary_cross_entropy_with_logits_sum(&logits, &targets)?.to_scalar::<f32>()? as f64;

            let predictions = binarize(&candle_nn::ops::sigmoid(&logits)?)?;
            let truth = binarize(&targets)?;
            let f1 = compute_f1_score(truth.view(), predictions.view())?;
            log::debug!("validation batch {}: f1 {:.4}", batch_f1.len(), f1);
            batch_f1.push(f1);
        }

        let mean_f1 = batch_f1.iter().sum::<f64>() / batch_f1.len() as f64;
        let loss = loss / t_size as f64;

        log::info!(
            "Validation set: Avg_Loss = {:.2}; F1_Score = {:.2}",
            loss,
            100.0 * mean_f1
        );

        Ok(ValidationReport {
            loss,
            mean_f1,
            batch_f1,
        })
    }

    /// Loss and full-set F1 over an external test loader
    ///
    /// `test_labels` must hold the loader's labels in the order the loader
    /// visits them.
    pub fn test(
        &mut self,
        loader: &mut impl BatchDataLoader,
        test_labels: ArrayView2<f32>,
    ) -> Result<TestReport> {
        self.model.eval();
        loader.reset();

        let mut loss = 0.0f64;
        let mut t_size = 0usize;
        let mut outputs: Vec<Array2<u8>> = Vec::with_capacity(loader.num_batches());

        while let Some((inputs, targets)) = loader.next_batch(&self.device)? {
            t_size += inputs.dim(0)?;

            let logits = self.model.logits(&inputs)?;
            loss += binary_cross_entropy_with_logits_sum(&logits, &targets)?.to_scalar::<f32>()? as f64;
            outputs.push(binarize(&candle_nn::ops::sigmoid(&logits)?)?);
        }

        if t_size == 0 {
            return Err(MLPError::Training("test loader yielded no examples".to_string()));
        }

        let views: Vec<ArrayView2<u8>> = outputs.iter().map(|o| o.view()).collect();
        let predictions = ndarray::concatenate(Axis(0), &views)
            .map_err(|e| MLPError::Shape(e.to_string()))?;

        if predictions.shape() != test_labels.shape() {
            return Err(MLPError::Shape(format!(
                "test predictions {:?} vs test labels {:?}",
                predictions.shape(),
                test_labels.shape()
            )));
        }

        let truth = test_labels.mapv(|v| u8::from(v > 0.5));
        let f1 = compute_f1_score(truth.view(), predictions.view())?;
        let loss = loss / t_size as f64;

        log::info!("Test set : Avg_Loss = {:.2}; F1 score = {:.2}%", loss, 100.0 * f1);

        Ok(TestReport {
            loss,
            f1,
            predictions,
        })
    }

    /// Train and validate for `num_epochs`, stepping the scheduler once per epoch
    pub fn fit(&mut self, num_epochs: usize, scheduler: &mut StepScheduler) -> Result<TrainingResults> {
        log::info!(
            "Starting training for {} epochs ({} batches per epoch)",
            num_epochs,
            self.train_loader.num_batches()
        );

        let mut results = TrainingResults::new();

        for _ in 0..num_epochs {
            let epoch = self.epochs_completed;
            let loss_train = self.train_epoch(epoch)?;
            let report = self.validate()?;

            let lr = scheduler.step();
            self.set_learning_rate(lr);

            results.push(loss_train, report.loss, report.mean_f1);
            self.epochs_completed += 1;
            self.last_losses = Some((loss_train, report.loss));

            log::debug!("Epoch {} done, lr now {:.2e}", epoch, lr);
        }

        Ok(results)
    }

    /// Sequential loader over an external test set
    pub fn test_loader(&self, dataset: MultiLabelDataset) -> Result<MultiLabelLoader> {
        let model_config = self.model.config();
        if dataset.dim_input() != model_config.dim_input || dataset.n_labels() != model_config.n_labels {
            return Err(MLPError::Shape(format!(
                "test set has dim_input={} n_labels={}, model expects ({}, {})",
                dataset.dim_input(),
                dataset.n_labels(),
                model_config.dim_input,
                model_config.n_labels
            )));
        }

        MultiLabelLoader::sequential(Arc::new(dataset), self.config.batch_size_eval)
    }

    /// Hidden representation `[B, n_hidden_units]` for downstream models
    pub fn extract_features(&mut self, inputs: &Tensor) -> Result<Tensor> {
        let previous = self.model.only_feature_extraction();
        self.model.set_only_feature_extraction(true);
        let features = self.model.forward(inputs);
        self.model.set_only_feature_extraction(previous);
        Ok(features?)
    }

    /// Save weights and metadata
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let metadata = CheckpointMetadata {
            epoch: self.epochs_completed,
            lr: self.learning_rate(),
            loss_train: self.last_losses.map(|(t, _)| t),
            loss_valid: self.last_losses.map(|(_, v)| v),
            config: self.model.config().clone(),
        };
        save_checkpoint(&self.varmap, path, &metadata)
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    pub fn set_learning_rate(&mut self, lr: f64) {
        self.optimizer.set_learning_rate(lr);
    }

    pub fn model(&self) -> &FeatureMlp {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FeatureMlp {
        &mut self.model
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Total number of trainable scalars
    pub fn num_parameters(&self) -> usize {
        self.varmap
            .all_vars()
            .iter()
            .map(|v| count_parameters(v.as_tensor()))
            .sum()
    }

    pub fn n_train(&self) -> usize {
        self.train_loader.partition().len()
    }

    pub fn n_valid(&self) -> usize {
        self.valid_loader.partition().len()
    }

    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }
}
