use crate::hooks::StepReport;

/// Scalar trajectories recorded at every report, kept in parallel and never trimmed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrainingHistory {
    pub episodes: Vec<usize>,
    pub mus: Vec<f32>,
    pub sigmas: Vec<f32>,
    pub rewards: Vec<f32>,
    pub targets: Vec<f32>,
}

impl TrainingHistory {
    pub fn record(&mut self, report: &StepReport) {
        self.episodes.push(report.episode);
        self.mus.push(report.mu);
        self.sigmas.push(report.sigma);
        self.rewards.push(report.reward);
        self.targets.push(report.target);
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// The plotted series as `(label, points)` pairs, in legend order.
    pub fn series(&self) -> [(&'static str, Vec<(f64, f64)>); 4] {
        [
            ("mu", self.points(&self.mus)),
            ("sigma", self.points(&self.sigmas)),
            ("reward", self.points(&self.rewards)),
            ("target", self.points(&self.targets)),
        ]
    }

    fn points(&self, values: &[f32]) -> Vec<(f64, f64)> {
        self.episodes
            .iter()
            .zip(values)
            .map(|(episode, value)| (*episode as f64, *value as f64))
            .collect()
    }

    /// Mean of the first `window` recorded mu values. `None` when nothing was recorded.
    pub fn head_mean_mu(&self, window: usize) -> Option<f32> {
        mean(&self.mus[..window.min(self.mus.len())])
    }

    /// Mean of the last `window` recorded mu values. `None` when nothing was recorded.
    pub fn tail_mean_mu(&self, window: usize) -> Option<f32> {
        let start = self.mus.len().saturating_sub(window);
        mean(&self.mus[start..])
    }

    pub fn tail_mean_sigma(&self, window: usize) -> Option<f32> {
        let start = self.sigmas.len().saturating_sub(window);
        mean(&self.sigmas[start..])
    }

    pub fn tail_mean_reward(&self, window: usize) -> Option<f32> {
        let start = self.rewards.len().saturating_sub(window);
        mean(&self.rewards[start..])
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}
