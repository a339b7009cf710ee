use anyhow::Result;
use gpg_agents::BanditReinforceBuilder;
use gpg_core::{
    Algorithm,
    config::BanditConfig,
    history::TrainingHistory,
    hooks::{ConsoleHooks, StepReport, TrainingHooks},
};

const WINDOW: usize = 10;

fn seeded(seed: u64) -> BanditConfig {
    BanditConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn full_run_moves_mu_towards_the_target() -> Result<()> {
    let config = seeded(0);
    let target = config.target;
    let mut algo = BanditReinforceBuilder::new(config).build(())?;
    algo.train()?;
    let history = &algo.history;
    assert_eq!(history.len(), 101);
    assert_eq!(history.episodes.last(), Some(&10_000));
    let head = history.head_mean_mu(WINDOW).unwrap_or(f32::NAN);
    let tail = history.tail_mean_mu(WINDOW).unwrap_or(f32::NAN);
    assert!(
        (target - tail).abs() < (target - head).abs(),
        "mu went from {head} to {tail}"
    );
    assert!(history.sigmas.iter().all(|s| *s > 0. && s.is_finite()));
    let head_sigma = history.sigmas[..WINDOW].iter().sum::<f32>() / WINDOW as f32;
    let tail_sigma = history.tail_mean_sigma(WINDOW).unwrap_or(f32::NAN);
    assert!(tail_sigma < head_sigma, "sigma went from {head_sigma} to {tail_sigma}");
    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> Result<()> {
    let run = |seed: u64| -> Result<TrainingHistory> {
        let config = BanditConfig {
            iterations: 300,
            report_interval: 10,
            ..seeded(seed)
        };
        let mut algo = BanditReinforceBuilder::new(config).build(())?;
        algo.train()?;
        Ok(algo.history)
    };
    let first = run(21)?;
    assert_eq!(first.len(), 30);
    assert_eq!(first, run(21)?);
    assert_ne!(first, run(22)?);
    Ok(())
}

#[test]
fn clipped_run_stays_finite() -> Result<()> {
    let config = BanditConfig {
        iterations: 500,
        max_grad_norm: Some(0.1),
        ..seeded(3)
    };
    let mut algo = BanditReinforceBuilder::new(config).build(())?;
    algo.train()?;
    assert_eq!(algo.history.len(), 5);
    for (mu, sigma) in algo.history.mus.iter().zip(&algo.history.sigmas) {
        assert!(mu.is_finite() && sigma.is_finite() && *sigma > 0.);
    }
    Ok(())
}

#[derive(Default)]
struct Recorder {
    inits: usize,
    episodes: Vec<usize>,
    history_lengths: Vec<usize>,
    final_len: Option<usize>,
}

impl TrainingHooks for Recorder {
    fn init_hook(&mut self) -> Result<()> {
        self.inits += 1;
        Ok(())
    }

    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()> {
        self.episodes.push(report.episode);
        self.history_lengths.push(history.len());
        Ok(())
    }

    fn shutdown_hook(&mut self, history: &TrainingHistory) -> Result<()> {
        self.final_len = Some(history.len());
        Ok(())
    }
}

#[test]
fn hooks_see_every_report_with_the_history_so_far() -> Result<()> {
    let config = BanditConfig {
        iterations: 1_001,
        ..seeded(9)
    };
    let hooks = (ConsoleHooks::with_writer(Vec::new()), Recorder::default());
    let mut algo = BanditReinforceBuilder::new(config).build(hooks)?;
    algo.train()?;
    let (console, recorder) = algo.hooks;
    assert_eq!(recorder.inits, 1);
    assert_eq!(recorder.episodes, (0..=1_000).step_by(100).collect::<Vec<_>>());
    assert_eq!(recorder.history_lengths, (1..=11).collect::<Vec<_>>());
    assert_eq!(recorder.final_len, Some(11));
    let printed = String::from_utf8(console.into_inner())?;
    assert_eq!(printed.matches("======episode").count(), 11);
    assert!(printed.starts_with("\n======episode 0 ======\nmu 0.0\n"));
    Ok(())
}

struct FailingHooks;

impl TrainingHooks for FailingHooks {
    fn report_hook(&mut self, report: &StepReport, _history: &TrainingHistory) -> Result<()> {
        anyhow::bail!("viewer closed at episode {}", report.episode)
    }
}

#[test]
fn hook_errors_stop_the_run() -> Result<()> {
    let mut algo = BanditReinforceBuilder::new(seeded(1)).build(FailingHooks)?;
    let err = algo.train().err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("viewer closed at episode 0"));
    assert_eq!(algo.history.len(), 1);
    Ok(())
}
