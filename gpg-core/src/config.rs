use crate::{hooks::LearningSchedule, reward::RewardShape};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
    #[error("at least one hidden layer is required")]
    NoHiddenLayers,
}

/// Hyperparameters of a bandit training run. `Default` gives the reference setup.
#[derive(Debug, Clone, PartialEq)]
pub struct BanditConfig {
    pub target: f32,
    pub tolerance: f32,
    pub max_reward: f32,
    /// initial mu, carried by the mu head bias
    pub bias_mu: f32,
    /// initial sigma pre-activation, softplus(0.55) is roughly 1.0
    pub bias_sigma: f32,
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_grad_norm: Option<f32>,
    pub log_epsilon: f64,
    pub iterations: usize,
    pub report_interval: usize,
    pub seed: Option<u64>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            target: 4.0,
            tolerance: 0.25,
            max_reward: 1.0,
            bias_mu: 0.0,
            bias_sigma: 0.55,
            hidden_layers: vec![5, 5],
            learning_rate: 0.001,
            max_grad_norm: None,
            log_epsilon: 1e-5,
            iterations: 10_001,
            report_interval: 100,
            seed: None,
        }
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0. {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

impl BanditConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("target", self.target as f64)?;
        positive("tolerance", self.tolerance as f64)?;
        positive("max_reward", self.max_reward as f64)?;
        finite("bias_mu", self.bias_mu as f64)?;
        finite("bias_sigma", self.bias_sigma as f64)?;
        positive("learning_rate", self.learning_rate)?;
        positive("log_epsilon", self.log_epsilon)?;
        if let Some(max_grad_norm) = self.max_grad_norm {
            positive("max_grad_norm", max_grad_norm as f64)?;
        }
        if self.hidden_layers.is_empty() {
            return Err(ConfigError::NoHiddenLayers);
        }
        if self.hidden_layers.contains(&0) {
            return Err(ConfigError::Zero {
                name: "hidden layer width",
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::Zero { name: "iterations" });
        }
        if self.report_interval == 0 {
            return Err(ConfigError::Zero {
                name: "report_interval",
            });
        }
        Ok(())
    }

    pub fn reward_shape(&self) -> RewardShape {
        RewardShape::new(self.target, self.tolerance, self.max_reward)
    }

    pub fn learning_schedule(&self) -> LearningSchedule {
        LearningSchedule::iteration_bound(self.iterations, self.report_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_reference_setup() {
        let config = BanditConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.reward_shape(), RewardShape::default());
        assert_eq!(config.learning_schedule(), LearningSchedule::default());
        assert_eq!(config.hidden_layers, vec![5, 5]);
        assert_eq!(config.learning_rate, 0.001);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = |f: fn(&mut BanditConfig)| {
            let mut config = BanditConfig::default();
            f(&mut config);
            config.validate()
        };
        assert_eq!(
            bad(|c| c.tolerance = 0.),
            Err(ConfigError::NotPositive {
                name: "tolerance",
                value: 0.
            })
        );
        assert!(matches!(
            bad(|c| c.max_reward = -1.),
            Err(ConfigError::NotPositive { name: "max_reward", .. })
        ));
        assert!(matches!(
            bad(|c| c.target = f32::NAN),
            Err(ConfigError::NotFinite { name: "target", .. })
        ));
        assert!(matches!(
            bad(|c| c.learning_rate = f64::INFINITY),
            Err(ConfigError::NotFinite { name: "learning_rate", .. })
        ));
        assert!(matches!(
            bad(|c| c.max_grad_norm = Some(0.)),
            Err(ConfigError::NotPositive { name: "max_grad_norm", .. })
        ));
        assert_eq!(bad(|c| c.hidden_layers.clear()), Err(ConfigError::NoHiddenLayers));
        assert!(matches!(bad(|c| c.hidden_layers = vec![5, 0]), Err(ConfigError::Zero { .. })));
        assert_eq!(
            bad(|c| c.iterations = 0),
            Err(ConfigError::Zero { name: "iterations" })
        );
        assert_eq!(
            bad(|c| c.report_interval = 0),
            Err(ConfigError::Zero {
                name: "report_interval"
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = ConfigError::NotPositive {
            name: "tolerance",
            value: -0.5,
        };
        assert_eq!(err.to_string(), "tolerance must be strictly positive, got -0.5");
    }
}
