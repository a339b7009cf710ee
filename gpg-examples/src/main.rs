use anyhow::Result;
use clap::Parser;
use gpg_agents::BanditReinforceBuilder;
use gpg_core::{Algorithm, hooks::ConsoleHooks};
use gpg_examples::{cli::Cli, tui_plot::TuiPlotHooks};

/// Number of reports averaged for the start and end of run summary.
const SUMMARY_WINDOW: usize = 10;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;
    tracing::info!(?config, plot = !cli.no_plot, "starting gaussian bandit");

    let hooks = (ConsoleHooks::new(), (!cli.no_plot).then(TuiPlotHooks::default));
    let mut algo = BanditReinforceBuilder::new(config).build(hooks)?;
    algo.train()?;

    let history = &algo.history;
    tracing::info!(
        reports = history.len(),
        first_mu = ?history.head_mean_mu(SUMMARY_WINDOW),
        last_mu = ?history.tail_mean_mu(SUMMARY_WINDOW),
        last_sigma = ?history.tail_mean_sigma(SUMMARY_WINDOW),
        last_reward = ?history.tail_mean_reward(SUMMARY_WINDOW),
        "training finished"
    );
    Ok(())
}
