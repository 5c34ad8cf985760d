//! Model serialization/deserialization (feature: `serde`).
//!
//! A versioned on-disk format for [`Mlp`]. The internal layer structs are not
//! serialized directly: only parameters and structure are stored, never the
//! forward caches or gradients. Loading re-validates shapes, finiteness and the
//! dimension chain.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Layer, Linear, Mlp, Relu, Result, Softmax, Tensor};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedMlp {
    pub format_version: u32,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializedLayer {
    Linear {
        in_features: usize,
        out_features: usize,
        /// Row-major `[in_features, out_features]`.
        weight: Vec<f32>,
        bias: Vec<f32>,
    },
    Relu,
    Softmax,
}

impl From<&Mlp> for SerializedMlp {
    fn from(model: &Mlp) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            layers: model.layers().iter().map(SerializedLayer::from).collect(),
        }
    }
}

impl From<&Layer> for SerializedLayer {
    fn from(layer: &Layer) -> Self {
        match layer {
            Layer::Linear(l) => SerializedLayer::Linear {
                in_features: l.in_features(),
                out_features: l.out_features(),
                weight: l.weight().data().to_vec(),
                bias: l.bias().data().to_vec(),
            },
            Layer::Relu(_) => SerializedLayer::Relu,
            Layer::Softmax(_) => SerializedLayer::Softmax,
        }
    }
}

impl TryFrom<SerializedLayer> for Layer {
    type Error = Error;

    fn try_from(value: SerializedLayer) -> Result<Self> {
        Ok(match value {
            SerializedLayer::Linear {
                in_features,
                out_features,
                weight,
                bias,
            } => {
                let weight = Tensor::from_vec(weight, &[in_features, out_features])?;
                let bias = Tensor::from_vec(bias, &[out_features])?;
                Layer::Linear(Linear::from_parts(weight, bias)?)
            }
            SerializedLayer::Relu => Layer::Relu(Relu::new()),
            SerializedLayer::Softmax => Layer::Softmax(Softmax::new()),
        })
    }
}

impl TryFrom<SerializedMlp> for Mlp {
    type Error = Error;

    fn try_from(value: SerializedMlp) -> Result<Self> {
        if value.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                value.format_version, MODEL_FORMAT_VERSION
            )));
        }

        let layers = value
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, layer)| {
                Layer::try_from(layer)
                    .map_err(|e| Error::InvalidData(format!("layer {i} invalid: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Mlp::from_layers(layers)
    }
}

impl Mlp {
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SerializedMlp::from(self))?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&SerializedMlp::from(self))?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedMlp = serde_json::from_str(s)?;
        ser.try_into()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_string_pretty()?)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::LayerKind;

    #[test]
    fn json_roundtrip_preserves_structure_and_outputs() {
        let mut mlp = Mlp::new_with_seed(3, &[4], 2, 9).unwrap();
        let json = mlp.to_json_string().unwrap();
        let mut loaded = Mlp::from_json_str(&json).unwrap();

        assert_eq!(loaded.layer_kinds(), mlp.layer_kinds());
        let x = Tensor::from_rows(&[vec![0.5, -1.0, 2.0]]).unwrap();
        assert_eq!(loaded.forward(&x), mlp.forward(&x));
    }

    #[test]
    fn format_is_tagged_by_layer_kind() {
        let json = r#"{
            "format_version": 1,
            "layers": [
                {"kind": "linear", "in_features": 2, "out_features": 1,
                 "weight": [0.5, -0.5], "bias": [0.0]},
                {"kind": "softmax"}
            ]
        }"#;
        let mlp = Mlp::from_json_str(json).unwrap();
        assert_eq!(
            mlp.layer_kinds(),
            [
                LayerKind::Linear {
                    in_features: 2,
                    out_features: 1
                },
                LayerKind::Softmax
            ]
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let bad = r#"{"format_version":999,"layers":[]}"#;
        let err = Mlp::from_json_str(bad).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_parameter_count_mismatch() {
        let bad = r#"{"format_version":1,"layers":[
            {"kind":"linear","in_features":2,"out_features":2,"weight":[1.0],"bias":[0.0,0.0]}
        ]}"#;
        let err = Mlp::from_json_str(bad).unwrap_err();
        assert!(format!("{err}").contains("layer 0"));
    }
}
