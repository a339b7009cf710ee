use clap::Parser;
use gpg_core::config::BanditConfig;

/// Trains a Gaussian policy on a one-dimensional bandit with REINFORCE.
#[derive(Parser, Debug, Clone)]
#[command(name = "gaussian-bandit", version, about)]
pub struct Cli {
    /// Action the reward peaks at
    #[arg(long, default_value_t = 4.0, allow_negative_numbers = true)]
    pub target: f32,

    /// Half width of the band that earns the full reward
    #[arg(long, default_value_t = 0.25)]
    pub tolerance: f32,

    #[arg(long, default_value_t = 1.0)]
    pub max_reward: f32,

    /// Initial mu
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub bias_mu: f32,

    /// Initial sigma before the softplus
    #[arg(long, default_value_t = 0.55, allow_negative_numbers = true)]
    pub bias_sigma: f32,

    /// Widths of the hidden ReLU layers
    #[arg(long, value_delimiter = ',', default_values_t = [5, 5])]
    pub hidden_layers: Vec<usize>,

    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 10_001)]
    pub iterations: usize,

    #[arg(long, default_value_t = 100)]
    pub report_interval: usize,

    /// Seeds weight initialisation and action sampling, the OS rng is used otherwise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Clip the global gradient norm to this value
    #[arg(long)]
    pub max_grad_norm: Option<f32>,

    /// Skip the blocking chart on every report
    #[arg(long)]
    pub no_plot: bool,
}

impl Cli {
    pub fn config(&self) -> BanditConfig {
        BanditConfig {
            target: self.target,
            tolerance: self.tolerance,
            max_reward: self.max_reward,
            bias_mu: self.bias_mu,
            bias_sigma: self.bias_sigma,
            hidden_layers: self.hidden_layers.clone(),
            learning_rate: self.learning_rate,
            max_grad_norm: self.max_grad_norm,
            iterations: self.iterations,
            report_interval: self.report_interval,
            seed: self.seed,
            ..Default::default()
        }
    }
}
