use candle_core::{Result, Tensor};
use candle_nn::{Activation, Init, Linear, Module, VarBuilder};
use either::Either;

#[derive(Debug, Clone)]
pub struct LinearLayer {
    layer: Linear,
    name: String,
}

impl LinearLayer {
    pub fn new(
        in_dim: usize,
        out_dim: usize,
        vb: &VarBuilder,
        prefix: &str,
        weight_init: Init,
        bias_init: Init,
    ) -> Result<Self> {
        let vb = vb.pp(prefix);
        let weight = vb.get_with_hints((out_dim, in_dim), "weight", weight_init)?;
        let bias = vb.get_with_hints(out_dim, "bias", bias_init)?;
        Ok(Self {
            layer: Linear::new(weight, Some(bias)),
            name: prefix.to_owned(),
        })
    }

    /// Zero weights and a constant bias: the layer outputs `bias` until it receives gradients.
    pub fn constant(
        in_dim: usize,
        out_dim: usize,
        vb: &VarBuilder,
        prefix: &str,
        bias: f64,
    ) -> Result<Self> {
        Self::new(in_dim, out_dim, vb, prefix, Init::Const(0.), Init::Const(bias))
    }

    pub fn weight_path(&self) -> String {
        format!("{}.weight", self.name)
    }
}

impl Module for LinearLayer {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.layer.forward(xs)
    }
}

#[derive(Debug, Clone)]
pub struct ActivationLayer(pub Activation);

impl Module for ActivationLayer {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.0.forward(xs)
    }
}

#[derive(Debug, Clone)]
pub struct Layer(pub Either<LinearLayer, ActivationLayer>);

impl Layer {
    pub fn linear(linear: LinearLayer) -> Self {
        Self(Either::Left(linear))
    }

    pub fn activation(activation: ActivationLayer) -> Self {
        Self(Either::Right(activation))
    }
}

impl Module for Layer {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        match &self.0 {
            Either::Left(linear) => linear.forward(xs),
            Either::Right(activation) => activation.forward(xs),
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl Module for LayerStack {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.clone();
        for layer in self.layers.iter() {
            xs = layer.forward(&xs)?
        }
        Ok(xs)
    }
}

impl LayerStack {
    pub fn linear_layers(&self) -> impl Iterator<Item = &LinearLayer> {
        self.layers.iter().filter_map(|layer| layer.0.as_ref().left())
    }

    pub fn add_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Hidden trunk where every linear layer is followed by a ReLU, so the last hidden layer can feed
/// several heads. Biases start at zero.
pub fn build_relu_trunk(
    input_dim: usize,
    layers: &[usize],
    vb: &VarBuilder,
    prefix: &str,
    weight_init: Init,
) -> Result<(LayerStack, usize)> {
    let mut last_dim = input_dim;
    let mut nn = LayerStack::default();
    for (layer_idx, layer_size) in layers.iter().enumerate() {
        let layer_pp = format!("{prefix}{layer_idx}");
        let lin_layer =
            LinearLayer::new(last_dim, *layer_size, vb, &layer_pp, weight_init, Init::Const(0.))?;
        nn = nn
            .add_layer(Layer::linear(lin_layer))
            .add_layer(Layer::activation(ActivationLayer(Activation::Relu)));
        last_dim = *layer_size;
    }
    Ok((nn, last_dim))
}
