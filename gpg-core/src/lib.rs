pub mod config;
pub mod history;
pub mod hooks;
pub mod reward;
pub mod rng;

use anyhow::Result;

/// A learning algorithm. The bandit REINFORCE loop is the only implementor.
pub trait Algorithm {
    fn train(&mut self) -> Result<()>;
}
