/// Step learning rate scheduler
///
/// The rate is multiplied by `gamma` every `step_size` epochs:
/// `lr(epoch) = lr_init * gamma^(epoch / step_size)`.
/// The caller steps it once per epoch and hands the new rate to the optimizer.

/// Step scheduler configuration
#[derive(Debug, Clone)]
pub struct StepSchedulerConfig {
    /// Initial learning rate
    pub lr_init: f64,
    /// Number of epochs between decays
    pub step_size: usize,
    /// Multiplicative decay factor
    pub gamma: f64,
}

impl Default for StepSchedulerConfig {
    fn default() -> Self {
        Self {
            lr_init: 1e-3,
            step_size: 25,
            gamma: 0.1,
        }
    }
}

/// Step learning rate scheduler
pub struct StepScheduler {
    config: StepSchedulerConfig,
    current_epoch: usize,
}

impl StepScheduler {
    /// Create new step scheduler
    pub fn new(config: StepSchedulerConfig) -> Self {
        Self {
            config,
            current_epoch: 0,
        }
    }

    /// Scheduler matching a training configuration
    pub fn from_config(config: &super::TrainingConfig) -> Self {
        Self::new(StepSchedulerConfig {
            lr_init: config.learning_rate,
            step_size: config.lr_step_size,
            gamma: config.lr_gamma,
        })
    }

    /// Get learning rate for current epoch
    pub fn get_lr(&self) -> f64 {
        self.get_lr_at_epoch(self.current_epoch)
    }

    /// Get learning rate for a specific epoch
    pub fn get_lr_at_epoch(&self, epoch: usize) -> f64 {
        let decays = epoch / self.config.step_size.max(1);
        self.config.lr_init * self.config.gamma.powi(decays as i32)
    }

    /// Advance one epoch and return the rate to use from now on
    pub fn step(&mut self) -> f64 {
        self.current_epoch += 1;
        self.get_lr()
    }

    /// Get number of completed steps
    pub fn get_step(&self) -> usize {
        self.current_epoch
    }

    /// Reset scheduler to initial state
    pub fn reset(&mut self) {
        self.current_epoch = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_within_step() {
        let scheduler = StepScheduler::new(StepSchedulerConfig::default());

        for epoch in 0..25 {
            assert!((scheduler.get_lr_at_epoch(epoch) - 1e-3).abs() < 1e-15);
        }
    }

    #[test]
    fn test_decay_boundaries() {
        let scheduler = StepScheduler::new(StepSchedulerConfig::default());

        assert!((scheduler.get_lr_at_epoch(24) - 1e-3).abs() < 1e-15);
        assert!((scheduler.get_lr_at_epoch(25) - 1e-4).abs() < 1e-15);
        assert!((scheduler.get_lr_at_epoch(49) - 1e-4).abs() < 1e-15);
        assert!((scheduler.get_lr_at_epoch(50) - 1e-5).abs() < 1e-15);
    }

    #[test]
    fn test_scheduler_stepping() {
        let mut scheduler = StepScheduler::new(StepSchedulerConfig {
            lr_init: 1.0,
            step_size: 2,
            gamma: 0.5,
        });

        assert_eq!(scheduler.get_step(), 0);
        assert!((scheduler.step() - 1.0).abs() < 1e-12);
        assert!((scheduler.step() - 0.5).abs() < 1e-12);
        assert!((scheduler.step() - 0.5).abs() < 1e-12);
        assert!((scheduler.step() - 0.25).abs() < 1e-12);
        assert_eq!(scheduler.get_step(), 4);
    }

    #[test]
    fn test_reset() {
        let mut scheduler = StepScheduler::new(StepSchedulerConfig::default());

        for _ in 0..30 {
            scheduler.step();
        }
        assert!(scheduler.get_lr() < 1e-3);

        scheduler.reset();
        assert_eq!(scheduler.get_step(), 0);
        assert!((scheduler.get_lr() - 1e-3).abs() < 1e-15);
    }
}
