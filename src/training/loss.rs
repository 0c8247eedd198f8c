/// Binary cross-entropy summed over every label of every example
use candle_core::Tensor;

/// Lower bound applied to each log term.
pub const LOG_FLOOR: f64 = -100.0;

fn check_shapes(predictions: &Tensor, targets: &Tensor) -> crate::Result<()> {
    if predictions.dims() != targets.dims() {
        return Err(crate::MLPError::Shape(format!(
            "predictions {:?} vs targets {:?}",
            predictions.dims(),
            targets.dims()
        )));
    }
    Ok(())
}

fn floor_log(log_term: &Tensor) -> candle_core::Result<Tensor> {
    let floor = log_term.zeros_like()?.affine(1.0, LOG_FLOOR)?;
    log_term.maximum(&floor)
}

/// `-sum [t * log_p + (1 - t) * log_not_p]`
fn reduce(log_p: &Tensor, log_not_p: &Tensor, targets: &Tensor) -> crate::Result<Tensor> {
    let not_t = targets.affine(-1.0, 1.0)?;
    let per_element = ((targets * log_p)? + (&not_t * log_not_p)?)?;
    Ok(per_element.sum_all()?.neg()?)
}

/// `log(1 + exp(x))` without overflow
fn softplus(x: &Tensor) -> candle_core::Result<Tensor> {
    let tail = x.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    x.relu()? + tail
}

/// Summed binary cross-entropy on probabilities
///
/// `-sum_{b,l} [t * log(p) + (1 - t) * log(1 - p)]` over a `[B, n_labels]`
/// batch. No averaging: the gradient scales with batch size and label count,
/// and callers divide accumulated sums by the number of examples themselves.
///
/// Each log term is floored at [`LOG_FLOOR`], so exact 0/1 probabilities give
/// a bounded loss. The gradient is only defined for `0 < p < 1`; train on
/// [`binary_cross_entropy_with_logits_sum`] when outputs can saturate.
pub fn binary_cross_entropy_sum(predictions: &Tensor, targets: &Tensor) -> crate::Result<Tensor> {
    check_shapes(predictions, targets)?;
    let targets = targets.to_dtype(predictions.dtype())?;

    let log_p = floor_log(&predictions.log()?)?;
    let log_not_p = floor_log(&predictions.affine(-1.0, 1.0)?.log()?)?;
    reduce(&log_p, &log_not_p, &targets)
}

/// Summed binary cross-entropy on pre-sigmoid scores
///
/// Same value as [`binary_cross_entropy_sum`] on `sigmoid(logits)`, computed
/// as `log(sigmoid(z)) = -softplus(-z)` and `log(1 - sigmoid(z)) = -softplus(z)`.
/// The logit gradient is `sigmoid(z) - t` until a log term reaches the floor.
pub fn binary_cross_entropy_with_logits_sum(logits: &Tensor, targets: &Tensor) -> crate::Result<Tensor> {
    check_shapes(logits, targets)?;
    let targets = targets.to_dtype(logits.dtype())?;

    let log_p = floor_log(&softplus(&logits.neg()?)?.neg()?)?;
    let log_not_p = floor_log(&softplus(logits)?.neg()?)?;
    reduce(&log_p, &log_not_p, &targets)
}
