pub mod reinforce;

pub use reinforce::{BanditReinforce, BanditReinforceBuilder};
