use anyhow::{Result, bail};
use candle_core::{Device, Tensor};
use gpg_candle_lm::{
    actor::{ActorSpec, GaussianActor, fixed_state, scalar},
    loss::weighted_gaussian_loss,
    optimizer::OptimizerWithMaxGrad,
};
use gpg_core::{
    Algorithm,
    config::BanditConfig,
    history::TrainingHistory,
    hooks::{LearningSchedule, StepReport, TrainingHooks},
    reward::RewardShape,
    rng::run_rng,
};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Single-state, single-step REINFORCE with a Gaussian actor.
///
/// Every iteration samples one action from the live policy, rewards it, and takes one optimizer
/// step on the reward-weighted negative log-likelihood of that action.
pub struct BanditReinforce<H: TrainingHooks> {
    pub actor: GaussianActor,
    pub optimizer: OptimizerWithMaxGrad,
    pub reward_shape: RewardShape,
    pub schedule: LearningSchedule,
    pub hooks: H,
    pub history: TrainingHistory,
    pub log_epsilon: f64,
    state: Tensor,
    rng: StdRng,
}

impl<H: TrainingHooks> BanditReinforce<H> {
    pub fn new(
        actor: GaussianActor,
        optimizer: OptimizerWithMaxGrad,
        reward_shape: RewardShape,
        schedule: LearningSchedule,
        hooks: H,
        log_epsilon: f64,
        rng: StdRng,
    ) -> Result<Self> {
        let state = fixed_state(1.0, actor.device())?;
        Ok(Self {
            actor,
            optimizer,
            reward_shape,
            schedule,
            hooks,
            history: TrainingHistory::default(),
            log_epsilon,
            state,
            rng,
        })
    }

    pub fn state(&self) -> &Tensor {
        &self.state
    }

    /// Forward pass, sample, reward and one optimizer step.
    ///
    /// The reported mu and sigma are the ones the action was sampled from, the loss is the one the
    /// step was taken on.
    pub fn step(&mut self, episode: usize) -> Result<StepReport> {
        let (mu, sigma) = self.actor.distribution_params(&self.state)?;
        if !mu.is_finite() || !sigma.is_finite() {
            bail!("non-finite policy at episode {episode}: mu {mu}, sigma {sigma}");
        }
        let action = Normal::new(mu, sigma)?.sample(&mut self.rng);
        let reward = self.reward_shape.reward(action);
        let loss = weighted_gaussian_loss(
            &self.actor,
            &self.state,
            action,
            reward,
            self.log_epsilon,
        )?;
        let loss_value = scalar(&loss)?;
        if !loss_value.is_finite() {
            bail!("non-finite loss at episode {episode}: {loss_value}");
        }
        self.optimizer.backward_step(&loss)?;
        Ok(StepReport {
            episode,
            mu,
            sigma,
            action,
            reward,
            loss: loss_value,
            target: self.reward_shape.target,
        })
    }
}

impl<H: TrainingHooks> Algorithm for BanditReinforce<H> {
    fn train(&mut self) -> Result<()> {
        self.hooks.init_hook()?;
        for episode in self.schedule.episodes() {
            let report = self.step(episode)?;
            if self.schedule.should_report(episode) {
                self.history.record(&report);
                self.hooks.report_hook(&report, &self.history)?;
            }
        }
        self.hooks.shutdown_hook(&self.history)
    }
}

#[derive(Debug, Clone)]
pub struct BanditReinforceBuilder {
    pub config: BanditConfig,
    pub device: Device,
}

impl Default for BanditReinforceBuilder {
    fn default() -> Self {
        Self::new(BanditConfig::default())
    }
}

impl BanditReinforceBuilder {
    pub fn new(config: BanditConfig) -> Self {
        Self {
            config,
            device: Device::Cpu,
        }
    }

    pub fn build<H: TrainingHooks>(&self, hooks: H) -> Result<BanditReinforce<H>> {
        self.config.validate()?;
        let mut rng = run_rng(self.config.seed);
        let actor = GaussianActor::build(&ActorSpec::from(&self.config), &self.device, &mut rng)?;
        let optimizer = OptimizerWithMaxGrad::adam(
            actor.varmap().clone(),
            self.config.learning_rate,
            self.config.max_grad_norm,
        )?;
        tracing::debug!(
            parameters = actor.trainable_vars().len(),
            learning_rate = optimizer.learning_rate(),
            "built gaussian actor"
        );
        BanditReinforce::new(
            actor,
            optimizer,
            self.config.reward_shape(),
            self.config.learning_schedule(),
            hooks,
            self.config.log_epsilon,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_run(seed: u64, iterations: usize) -> BanditConfig {
        BanditConfig {
            iterations,
            report_interval: 10,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn first_step_samples_from_the_initial_policy() -> Result<()> {
        let mut algo = BanditReinforceBuilder::new(short_run(3, 1)).build(())?;
        let report = algo.step(0)?;
        assert!(report.mu.abs() < 1e-6);
        assert!((report.sigma - 1.0).abs() < 0.01);
        assert_eq!(report.target, 4.0);
        assert_eq!(report.reward, algo.reward_shape.reward(report.action));
        assert!(report.loss.is_finite());
        Ok(())
    }

    #[test]
    fn every_step_updates_the_policy() -> Result<()> {
        let mut algo = BanditReinforceBuilder::new(short_run(11, 1)).build(())?;
        let state = algo.state().clone();
        let before = algo.actor.distribution_params(&state)?;
        algo.step(0)?;
        let after = algo.actor.distribution_params(&state)?;
        assert_ne!(before, after);
        Ok(())
    }

    #[test]
    fn records_history_on_report_iterations_only() -> Result<()> {
        let mut algo = BanditReinforceBuilder::new(short_run(5, 35)).build(())?;
        algo.train()?;
        assert_eq!(algo.history.episodes, vec![0, 10, 20, 30]);
        assert!(algo.history.sigmas.iter().all(|s| *s > 0.));
        assert!(algo.history.targets.iter().all(|t| *t == 4.0));
        Ok(())
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = BanditConfig {
            tolerance: -1.,
            ..Default::default()
        };
        assert!(BanditReinforceBuilder::new(config).build(()).is_err());
    }
}
