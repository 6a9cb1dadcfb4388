//! Feed-forward neural-network controller.
//!
//! A [`NeuralNetwork`] is a stack of dense layers. Each layer transition owns a weight
//! matrix of shape `[out, in]` and a bias vector of shape `[out]`; the shapes are fixed
//! by [`NeuralNetwork::layer_sizes`] at construction and only the values change
//! afterwards (through [`Layer::weights_mut`]).
//!
//! Every layer, including the output layer, applies `ReLU(W·a + b)`, so outputs are
//! non-negative. The action is the argmax of the outputs.
//!
//! # Persistence
//!
//! Networks serialize through [`NetworkDocument`]: nested arrays for weights and
//! biases plus the explicit layer sizes. Deserializing always goes through
//! [`NeuralNetwork::from_document`], so malformed files are rejected with a
//! [`NetworkError`] instead of producing a network with inconsistent shapes.
//!
//! ```
//! use rand::SeedableRng as _;
//! use snakevo_evaluator::network::NeuralNetwork;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let net = NeuralNetwork::random(24, &[16, 16], 4, &mut rng)?;
//! let json = serde_json::to_string(&net).unwrap();
//! let restored: NeuralNetwork = serde_json::from_str(&json).unwrap();
//! assert_eq!(net.forward(&[0.5; 24]), restored.forward(&[0.5; 24]));
//! # Ok::<(), snakevo_evaluator::network::NetworkError>(())
//! ```

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use snakevo_engine::{Controller, Vision};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network needs at least an input and an output layer")]
    NoLayers,
    #[display("layer {layer} has invalid size {size}")]
    InvalidLayerSize { layer: usize, size: usize },
    #[display("{weights} weight matrices but {biases} bias vectors")]
    LayerCountMismatch { weights: usize, biases: usize },
    #[display("declared layer sizes {declared:?} do not match weight shapes {derived:?}")]
    LayerSizesMismatch {
        declared: Vec<usize>,
        derived: Vec<usize>,
    },
    #[display("weight matrix {layer} is not {rows}x{cols}")]
    WeightShapeMismatch {
        layer: usize,
        rows: usize,
        cols: usize,
    },
    #[display("bias vector {layer} does not have {len} entries")]
    BiasShapeMismatch { layer: usize, len: usize },
}

/// One dense layer transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Array2<f32>,
    biases: Array1<f32>,
}

impl Layer {
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    /// Mutable view of the weights; the shape cannot be changed through it.
    pub fn weights_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.weights.view_mut()
    }

    #[must_use]
    pub fn biases(&self) -> ArrayView1<'_, f32> {
        self.biases.view()
    }

    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(input);
        output += &self.biases;
        output.mapv_inplace(|x| x.max(0.0));
        output
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkDocument", into = "NetworkDocument")]
pub struct NeuralNetwork {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Creates a network with weights and biases drawn from the standard normal
    /// distribution.
    pub fn random<R>(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let layer_sizes: Vec<usize> = std::iter::once(input_size)
            .chain(hidden_sizes.iter().copied())
            .chain([output_size])
            .collect();
        validate_layer_sizes(&layer_sizes)?;

        let layers = layer_sizes
            .windows(2)
            .map(|w| {
                let (input, output) = (w[0], w[1]);
                Layer {
                    weights: Array2::from_shape_fn((output, input), |_| {
                        rng.sample::<f32, _>(StandardNormal)
                    }),
                    biases: Array1::from_shape_fn(output, |_| rng.sample::<f32, _>(StandardNormal)),
                }
            })
            .collect();
        Ok(Self {
            layer_sizes,
            layers,
        })
    }

    /// Layer sizes: input, hidden..., output.
    #[must_use]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Computes the output activations.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from [`Self::input_size`].
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> Array1<f32> {
        assert_eq!(
            input.len(),
            self.input_size(),
            "input length must match the input layer"
        );
        self.layers
            .iter()
            .fold(ArrayView1::from(input).to_owned(), |activation, layer| {
                layer.forward(&activation)
            })
    }

    /// Returns the index of the largest output; ties go to the lowest index.
    #[must_use]
    pub fn predict(&self, input: &[f32]) -> usize {
        let output = self.forward(input);
        let mut best = 0;
        for (i, value) in output.iter().enumerate().skip(1) {
            if *value > output[best] {
                best = i;
            }
        }
        best
    }

    #[must_use]
    pub fn to_document(&self) -> NetworkDocument {
        NetworkDocument {
            layer_sizes: Some(self.layer_sizes.clone()),
            weights: self
                .layers
                .iter()
                .map(|l| l.weights.rows().into_iter().map(|r| r.to_vec()).collect())
                .collect(),
            biases: self
                .layers
                .iter()
                .map(|l| BiasVector::Flat(l.biases.to_vec()))
                .collect(),
        }
    }

    /// Rebuilds a network, checking every shape against the layer sizes.
    ///
    /// If the document has no `layer_sizes`, they are derived from the weight
    /// matrix shapes.
    pub fn from_document(doc: NetworkDocument) -> Result<Self, NetworkError> {
        let NetworkDocument {
            layer_sizes,
            weights,
            biases,
        } = doc;
        if weights.is_empty() {
            return Err(NetworkError::NoLayers);
        }
        if weights.len() != biases.len() {
            return Err(NetworkError::LayerCountMismatch {
                weights: weights.len(),
                biases: biases.len(),
            });
        }

        let derived: Vec<usize> = std::iter::once(weights[0].first().map_or(0, Vec::len))
            .chain(weights.iter().map(Vec::len))
            .collect();
        let layer_sizes = match layer_sizes {
            Some(declared) if declared.len() != derived.len() => {
                return Err(NetworkError::LayerSizesMismatch { declared, derived });
            }
            Some(declared) => declared,
            None => derived,
        };
        validate_layer_sizes(&layer_sizes)?;

        let layers = layer_parts(&layer_sizes, weights, biases)
            .map(|(layer, (input, output), rows, bias)| {
                let shape_err = NetworkError::WeightShapeMismatch {
                    layer,
                    rows: output,
                    cols: input,
                };
                if rows.len() != output || rows.iter().any(|r| r.len() != input) {
                    return Err(shape_err);
                }
                let weights = Array2::from_shape_vec((output, input), rows.concat())
                    .map_err(|_| shape_err)?;
                let bias = bias.into_values();
                if bias.len() != output {
                    return Err(NetworkError::BiasShapeMismatch { layer, len: output });
                }
                Ok(Layer {
                    weights,
                    biases: Array1::from(bias),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layer_sizes,
            layers,
        })
    }
}

fn layer_parts(
    layer_sizes: &[usize],
    weights: Vec<Vec<Vec<f32>>>,
    biases: Vec<BiasVector>,
) -> impl Iterator<Item = (usize, (usize, usize), Vec<Vec<f32>>, BiasVector)> + '_ {
    layer_sizes
        .windows(2)
        .map(|w| (w[0], w[1]))
        .zip(weights.into_iter().zip(biases))
        .enumerate()
        .map(|(layer, (dims, (rows, bias)))| (layer, dims, rows, bias))
}

fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<(), NetworkError> {
    if layer_sizes.len() < 2 {
        return Err(NetworkError::NoLayers);
    }
    if let Some((layer, &size)) = layer_sizes.iter().enumerate().find(|(_, s)| **s == 0) {
        return Err(NetworkError::InvalidLayerSize { layer, size });
    }
    Ok(())
}

impl Controller for NeuralNetwork {
    fn select_action(&self, vision: &Vision) -> usize {
        self.predict(vision.as_slice())
    }
}

impl TryFrom<NetworkDocument> for NeuralNetwork {
    type Error = NetworkError;

    fn try_from(doc: NetworkDocument) -> Result<Self, Self::Error> {
        Self::from_document(doc)
    }
}

impl From<NeuralNetwork> for NetworkDocument {
    fn from(net: NeuralNetwork) -> Self {
        net.to_document()
    }
}

/// Persisted form of a [`NeuralNetwork`].
///
/// `weights[l]` has shape `[out][in]` and `biases[l]` has `out` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_sizes: Option<Vec<usize>>,
    pub weights: Vec<Vec<Vec<f32>>>,
    pub biases: Vec<BiasVector>,
}

/// A bias vector, either flat (`[b0, b1]`) or as a column (`[[b0], [b1]]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiasVector {
    Flat(Vec<f32>),
    Column(Vec<[f32; 1]>),
}

impl BiasVector {
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        match self {
            Self::Flat(values) => values,
            Self::Column(column) => column.into_iter().map(|[v]| v).collect(),
        }
    }
}
