use candle_core::Tensor;
use derive_more::{Deref, DerefMut, Display};

#[derive(Deref, DerefMut, Debug, Display, Clone)]
pub struct Mu(pub Tensor);

#[derive(Deref, DerefMut, Debug, Display, Clone)]
pub struct Sigma(pub Tensor);

#[derive(Deref, DerefMut, Debug, Display, Clone)]
pub struct LogProbability(pub Tensor);

#[derive(Deref, DerefMut, Debug, Display, Clone)]
pub struct PolicyLoss(pub Tensor);
