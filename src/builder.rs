//! Network builder.
//!
//! The architecture is always the same shape: a stack of `Linear + ReLU` hidden
//! blocks followed by a `Linear + Softmax` head. The builder only decides the
//! widths and the weight initializer:
//!
//! - no hidden widths: `[Linear(n_inputs→n_classes), Softmax]`, i.e. multinomial
//!   logistic regression;
//! - hidden widths `[h1, …, hk]`: `Linear(n_inputs→h1), ReLU, …,
//!   Linear(h(k-1)→hk), ReLU, Linear(hk→n_classes), Softmax`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Init, Layer, Linear, Mlp, Relu, Result, Softmax};

/// Builder for an [`Mlp`].
///
/// ```rust
/// use ffnet::{Init, MlpBuilder};
///
/// # fn main() -> ffnet::Result<()> {
/// let mlp = MlpBuilder::new(4, 3)?
///     .hidden_layer(8)?
///     .init(Init::He)
///     .build_with_seed(0)?;
/// assert_eq!(mlp.num_layers(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MlpBuilder {
    n_inputs: usize,
    n_classes: usize,
    hidden: Vec<usize>,
    init: Init,
}

impl MlpBuilder {
    /// Start a network mapping `n_inputs` features to `n_classes` probabilities.
    pub fn new(n_inputs: usize, n_classes: usize) -> Result<Self> {
        if n_inputs == 0 {
            return Err(Error::InvalidConfig("n_inputs must be > 0".to_owned()));
        }
        if n_classes == 0 {
            return Err(Error::InvalidConfig("n_classes must be > 0".to_owned()));
        }
        Ok(Self {
            n_inputs,
            n_classes,
            hidden: Vec::new(),
            init: Init::default(),
        })
    }

    /// Append one hidden `Linear + ReLU` block of the given width.
    pub fn hidden_layer(mut self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidConfig(
                "hidden layer width must be > 0".to_owned(),
            ));
        }
        self.hidden.push(width);
        Ok(self)
    }

    pub fn hidden_layers(self, widths: &[usize]) -> Result<Self> {
        widths.iter().try_fold(self, |b, &w| b.hidden_layer(w))
    }

    pub fn init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    pub fn build_with_seed(self, seed: u64) -> Result<Mlp> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Mlp> {
        self.init.validate()?;

        let mut layers = Vec::with_capacity(2 * (self.hidden.len() + 1));
        let mut in_features = self.n_inputs;
        for &width in &self.hidden {
            layers.push(Layer::from(Linear::new_with_rng(
                in_features,
                width,
                self.init,
                rng,
            )?));
            layers.push(Layer::from(Relu::new()));
            in_features = width;
        }
        layers.push(Layer::from(Linear::new_with_rng(
            in_features,
            self.n_classes,
            self.init,
            rng,
        )?));
        layers.push(Layer::from(Softmax::new()));

        let mlp = Mlp::from_layers(layers)?;
        tracing::debug!(
            n_inputs = self.n_inputs,
            hidden = ?self.hidden,
            n_classes = self.n_classes,
            params = mlp.num_params(),
            "built mlp"
        );
        Ok(mlp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::LayerKind;

    #[test]
    fn rejects_zero_dims() {
        assert!(MlpBuilder::new(0, 3).is_err());
        assert!(MlpBuilder::new(3, 0).is_err());
        assert!(MlpBuilder::new(3, 2).unwrap().hidden_layers(&[4, 0]).is_err());
    }

    #[test]
    fn rejects_invalid_init() {
        let err = MlpBuilder::new(3, 2)
            .unwrap()
            .init(Init::Normal { std: f32::NAN })
            .build_with_seed(0)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn widths_chain_through_hidden_layers() {
        let mlp = MlpBuilder::new(4, 3)
            .unwrap()
            .hidden_layers(&[8, 6])
            .unwrap()
            .build_with_seed(0)
            .unwrap();

        let linear: Vec<LayerKind> = mlp
            .layer_kinds()
            .into_iter()
            .filter(|k| matches!(k, LayerKind::Linear { .. }))
            .collect();
        assert_eq!(
            linear,
            [
                LayerKind::Linear {
                    in_features: 4,
                    out_features: 8
                },
                LayerKind::Linear {
                    in_features: 8,
                    out_features: 6
                },
                LayerKind::Linear {
                    in_features: 6,
                    out_features: 3
                },
            ]
        );
        assert_eq!(mlp.input_dim(), 4);
        assert_eq!(mlp.output_dim(), 3);
    }
}
