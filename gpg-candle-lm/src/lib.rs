pub mod activation;
pub mod actor;
pub mod layers;
pub mod loss;
pub mod optimizer;
pub mod tensors;
