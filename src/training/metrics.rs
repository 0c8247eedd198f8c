/// F1 scores for multi-label predictions.
///
/// Inputs are equal-shaped `[B, n_labels]` 0/1 matrices. The training loop
/// uses example-based averaging: F1 is computed per example (row) from its
/// own true/predicted label sets, then averaged over examples. A row with no
/// true and no predicted labels scores 0.0.
use candle_core::{DType, Tensor};
use ndarray::{Array2, ArrayView2, Axis};

/// How per-label counts are reduced to one F1 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum F1Average {
    /// Per-example F1, then mean over examples
    #[default]
    Example,
    /// One F1 from counts pooled over every (example, label) cell
    Micro,
    /// Per-label F1, then mean over labels
    Macro,
}

/// True positive / false positive / false negative counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub tp: usize,
    pub fp: usize,
    pub fn_count: usize,
}

impl LabelCounts {
    fn add(&mut self, truth: u8, pred: u8) {
        match (pred != 0, truth != 0) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_count += 1,
            (false, false) => {}
        }
    }

    pub fn precision(&self) -> f64 {
        if self.tp + self.fp > 0 {
            self.tp as f64 / (self.tp + self.fp) as f64
        } else {
            0.0
        }
    }

    pub fn recall(&self) -> f64 {
        if self.tp + self.fn_count > 0 {
            self.tp as f64 / (self.tp + self.fn_count) as f64
        } else {
            0.0
        }
    }

    /// `2tp / (2tp + fp + fn)`, 0.0 when all three counts are zero
    pub fn f1(&self) -> f64 {
        let denom = 2 * self.tp + self.fp + self.fn_count;
        if denom == 0 {
            0.0
        } else {
            (2 * self.tp) as f64 / denom as f64
        }
    }
}

/// Example-based F1 as used by the training loop
pub fn compute_f1_score(targets: ArrayView2<u8>, predictions: ArrayView2<u8>) -> crate::Result<f64> {
    f1_score(targets, predictions, F1Average::Example)
}

/// F1 between two binary matrices with the given averaging
///
/// An empty matrix scores 0.0.
pub fn f1_score(
    targets: ArrayView2<u8>,
    predictions: ArrayView2<u8>,
    average: F1Average,
) -> crate::Result<f64> {
    if targets.shape() != predictions.shape() {
        return Err(crate::MLPError::Shape(format!(
            "targets {:?} vs predictions {:?}",
            targets.shape(),
            predictions.shape()
        )));
    }

    if targets.is_empty() {
        return Ok(0.0);
    }

    let score = match average {
        F1Average::Micro => {
            let mut counts = LabelCounts::default();
            for (&t, &p) in targets.iter().zip(predictions.iter()) {
                counts.add(t, p);
            }
            counts.f1()
        }
        F1Average::Example => mean_f1_along(targets, predictions, Axis(0)),
        F1Average::Macro => mean_f1_along(targets, predictions, Axis(1)),
    };

    Ok(score)
}

/// Mean of the F1 of each lane along `axis` (rows for Axis(0), columns for Axis(1))
fn mean_f1_along(targets: ArrayView2<u8>, predictions: ArrayView2<u8>, axis: Axis) -> f64 {
    let lanes = targets.len_of(axis);
    let total: f64 = targets
        .axis_iter(axis)
        .zip(predictions.axis_iter(axis))
        .map(|(t, p)| {
            let mut counts = LabelCounts::default();
            for (&ti, &pi) in t.iter().zip(p.iter()) {
                counts.add(ti, pi);
            }
            counts.f1()
        })
        .sum();
    total / lanes as f64
}

/// Round a `[B, n_labels]` probability tensor to 0/1 (threshold 0.5)
///
/// Exactly 0.5 rounds down, matching round-half-to-even.
pub fn binarize(output: &Tensor) -> crate::Result<Array2<u8>> {
    let (rows, cols) = output.dims2()?;
    let values = output.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?;
    let bits: Vec<u8> = values.iter().map(|&v| u8::from(v > 0.5)).collect();

    Array2::from_shape_vec((rows, cols), bits)
        .map_err(|e| crate::MLPError::Shape(e.to_string()))
}
