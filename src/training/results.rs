/// Per-epoch training history.
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Append-only record of per-epoch statistics
///
/// Serializes as `{"loss_train": [...], "loss_valid": [...], "f1_valid": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    loss_train: Vec<f64>,
    loss_valid: Vec<f64>,
    f1_valid: Vec<f64>,
}

impl TrainingResults {
    pub const METRICS: [&'static str; 3] = ["loss_train", "loss_valid", "f1_valid"];

    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished epoch
    pub fn push(&mut self, loss_train: f64, loss_valid: f64, f1_valid: f64) {
        self.loss_train.push(loss_train);
        self.loss_valid.push(loss_valid);
        self.f1_valid.push(f1_valid);
    }

    pub fn num_epochs(&self) -> usize {
        self.loss_train.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loss_train.is_empty()
    }

    pub fn loss_train(&self) -> &[f64] {
        &self.loss_train
    }

    pub fn loss_valid(&self) -> &[f64] {
        &self.loss_valid
    }

    pub fn f1_valid(&self) -> &[f64] {
        &self.f1_valid
    }

    /// Look a series up by metric name
    pub fn get(&self, metric: &str) -> Option<&[f64]> {
        match metric {
            "loss_train" => Some(&self.loss_train),
            "loss_valid" => Some(&self.loss_valid),
            "f1_valid" => Some(&self.f1_valid),
            _ => None,
        }
    }

    /// Write the history as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
