use candle_core::{Result, Tensor};

// past these points softplus is exp(x) (below) or x (above) to f32 precision
const SOFTPLUS_LOW: f32 = -8.;
const SOFTPLUS_HIGH: f32 = 15.;

/// `log(1 + exp(x))`, strictly positive for every finite input down to roughly -103, where the
/// f32 result underflows.
///
/// Each branch only sees clamped inputs so neither the forward pass nor the gradients of the
/// unselected branches can produce inf or NaN.
pub fn softplus(xs: &Tensor) -> Result<Tensor> {
    let middle = xs
        .clamp(SOFTPLUS_LOW, SOFTPLUS_HIGH)?
        .exp()?
        .affine(1., 1.)?
        .log()?;
    let low = xs.minimum(SOFTPLUS_LOW)?.exp()?;
    let high = xs.maximum(SOFTPLUS_HIGH)?;
    let below = xs.lt(SOFTPLUS_LOW)?;
    let above = xs.gt(SOFTPLUS_HIGH)?;
    above.where_cond(&high, &below.where_cond(&low, &middle)?)
}
