//! Reward-weighted Gaussian log-likelihood, the single-sample REINFORCE objective.
//!
//! The gradient of `-reward * log pi(action | state)` moves the actor towards actions that paid
//! well, in proportion to how well they paid. Action and reward are plain numbers here, so the
//! only gradient path is through mu and sigma.

use crate::{
    actor::GaussianActor,
    tensors::{LogProbability, PolicyLoss},
};
use anyhow::Result;
use candle_core::Tensor;
use std::f64::consts::PI;

/// Added to the density before taking the log, keeps the loss finite when the pdf underflows.
pub const LOG_EPSILON: f64 = 1e-5;

/// `log(pdf(action; mu, sigma) + epsilon)` for a Normal distribution.
pub fn gaussian_log_likelihood(
    mu: &Tensor,
    sigma: &Tensor,
    action: f32,
    epsilon: f64,
) -> Result<LogProbability> {
    let z = mu.affine(-1., action as f64)?.div(sigma)?;
    let normalizer = sigma.affine((2. * PI).sqrt(), 0.)?;
    let pdf = z.sqr()?.affine(-0.5, 0.)?.exp()?.div(&normalizer)?;
    Ok(LogProbability(pdf.affine(1., epsilon)?.log()?))
}

/// Re-evaluates the actor on `state` and returns `-reward * log pi(action | state)`.
pub fn weighted_gaussian_loss(
    actor: &GaussianActor,
    state: &Tensor,
    action: f32,
    reward: f32,
    epsilon: f64,
) -> Result<PolicyLoss> {
    let (mu, sigma) = actor.forward(state)?;
    let log_probability = gaussian_log_likelihood(&mu, &sigma, action, epsilon)?;
    let loss = log_probability.affine(-(reward as f64), 0.)?.sum_all()?;
    Ok(PolicyLoss(loss))
}
