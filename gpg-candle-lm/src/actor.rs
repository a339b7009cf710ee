use crate::{
    activation::softplus,
    layers::{LayerStack, LinearLayer, build_relu_trunk},
    tensors::{Mu, Sigma},
};
use anyhow::{Result, anyhow, bail};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Init, Module, VarBuilder, VarMap};
use gpg_core::config::BanditConfig;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Shape and initial output of a [`GaussianActor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSpec {
    pub input_dim: usize,
    pub hidden_layers: Vec<usize>,
    pub bias_mu: f32,
    pub bias_sigma: f32,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            input_dim: 1,
            hidden_layers: vec![5, 5],
            bias_mu: 0.0,
            bias_sigma: 0.55,
        }
    }
}

impl From<&BanditConfig> for ActorSpec {
    fn from(config: &BanditConfig) -> Self {
        Self {
            input_dim: 1,
            hidden_layers: config.hidden_layers.clone(),
            bias_mu: config.bias_mu,
            bias_sigma: config.bias_sigma,
        }
    }
}

/// Feed-forward actor mapping a state to the mean and spread of a Normal distribution.
///
/// A ReLU trunk feeds two width-1 heads: an identity head for mu and a softplus head for sigma.
/// Both heads start with zero weights, so the first output is `(bias_mu, softplus(bias_sigma))`
/// whatever the trunk initialisation was. Trunk weights are He-normal samples drawn from the
/// caller's rng, which makes a seeded run reproducible end to end.
pub struct GaussianActor {
    varmap: VarMap,
    trunk: LayerStack,
    mu_head: LinearLayer,
    sigma_head: LinearLayer,
    device: Device,
}

impl GaussianActor {
    pub fn build<R: Rng + ?Sized>(spec: &ActorSpec, device: &Device, rng: &mut R) -> Result<Self> {
        if spec.hidden_layers.is_empty() {
            bail!("the actor needs at least one hidden layer");
        }
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let (trunk, last_dim) = build_relu_trunk(
            spec.input_dim,
            &spec.hidden_layers,
            &vb,
            "hidden",
            Init::Const(0.),
        )?;
        for layer in trunk.linear_layers() {
            fill_he_normal(&varmap, &layer.weight_path(), rng)?;
        }
        let mu_head = LinearLayer::constant(last_dim, 1, &vb, "mu_head", spec.bias_mu as f64)?;
        let sigma_head =
            LinearLayer::constant(last_dim, 1, &vb, "sigma_head", spec.bias_sigma as f64)?;
        Ok(Self {
            varmap,
            trunk,
            mu_head,
            sigma_head,
            device: device.clone(),
        })
    }

    pub fn forward(&self, state: &Tensor) -> Result<(Mu, Sigma)> {
        let features = self.trunk.forward(state)?;
        let mu = self.mu_head.forward(&features)?;
        let sigma = softplus(&self.sigma_head.forward(&features)?)?;
        Ok((Mu(mu), Sigma(sigma)))
    }

    /// `(mu, sigma)` as plain scalars, for a single-row state.
    pub fn distribution_params(&self, state: &Tensor) -> Result<(f32, f32)> {
        let (mu, sigma) = self.forward(state)?;
        Ok((scalar(&mu)?, scalar(&sigma)?))
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    pub fn trainable_vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

// stddev of a unit normal truncated to [-2, 2]
const TRUNCATED_STDDEV: f32 = 0.879_625_66;

/// Standard deviation of the He-normal draw for `fan_in` inputs, before truncation at two of them.
pub fn he_normal_stddev(fan_in: usize) -> f32 {
    (2. / fan_in as f32).sqrt() / TRUNCATED_STDDEV
}

/// Overwrites the `(out, fan_in)` weight at `path` with He-normal samples, redrawing anything
/// further than two standard deviations from zero.
fn fill_he_normal<R: Rng + ?Sized>(varmap: &VarMap, path: &str, rng: &mut R) -> Result<()> {
    let data = varmap
        .data()
        .lock()
        .map_err(|err| anyhow!("varmap lock poisoned: {err}"))?;
    let var = data
        .get(path)
        .ok_or_else(|| anyhow!("no variable registered at {path}"))?;
    let (out_dim, fan_in) = var.dims2()?;
    let stddev = he_normal_stddev(fan_in);
    let normal = Normal::new(0f32, stddev)?;
    let values: Vec<f32> = (0..out_dim * fan_in)
        .map(|_| loop {
            let w = normal.sample(rng);
            if w.abs() <= 2. * stddev {
                break w;
            }
        })
        .collect();
    var.set(&Tensor::from_vec(values, (out_dim, fan_in), var.device())?)?;
    Ok(())
}

/// The constant bandit state `[[value]]`.
pub fn fixed_state(value: f32, device: &Device) -> Result<Tensor> {
    Ok(Tensor::new(&[[value]], device)?)
}

pub fn scalar(t: &Tensor) -> Result<f32> {
    if t.elem_count() != 1 {
        bail!("expected a single element tensor, got shape {:?}", t.dims());
    }
    Ok(t.flatten_all()?.to_vec1::<f32>()?[0])
}
