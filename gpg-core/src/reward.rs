/// Flat-topped reward around `target`.
///
/// Returns exactly `max_reward` while `|target - action| <= tolerance`, and decays as
/// `tolerance / |target - action|` outside of that band. Never reaches zero for a finite action.
pub fn shaped_reward(action: f32, target: f32, tolerance: f32, max_reward: f32) -> f32 {
    max_reward / f32::max(tolerance, (target - action).abs()) * tolerance
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardShape {
    pub target: f32,
    pub tolerance: f32,
    pub max_reward: f32,
}

impl Default for RewardShape {
    fn default() -> Self {
        Self {
            target: 4.0,
            tolerance: 0.25,
            max_reward: 1.0,
        }
    }
}

impl RewardShape {
    pub fn new(target: f32, tolerance: f32, max_reward: f32) -> Self {
        Self {
            target,
            tolerance,
            max_reward,
        }
    }

    pub fn reward(&self, action: f32) -> f32 {
        shaped_reward(action, self.target, self.tolerance, self.max_reward)
    }
}
