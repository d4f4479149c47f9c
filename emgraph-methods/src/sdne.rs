//! SDNE: structural deep network embedding.
//!
//! A deep autoencoder over adjacency rows. The second-order term reconstructs
//! each node's neighborhood with nonzero entries up-weighted by `beta`; the
//! first-order term pulls the embeddings of adjacent nodes together with a
//! Laplacian penalty weighted by `alpha`. Trained with minibatch SGD over
//! edges, both endpoints per sample.
//!
//! Wang et al., "Structural Deep Network Embedding" (KDD 2016).

use crate::{check_dimensions, EmbeddingMethod, MethodError, Result};
use emgraph_core::Graph;
use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for SDNE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdneConfig {
    /// Embedding dimension.
    pub d: usize,
    /// Reconstruction weight on nonzero adjacency entries.
    pub beta: f64,
    /// First-order proximity weight.
    pub alpha: f64,
    /// L1 weight regularization.
    pub nu1: f64,
    /// L2 weight regularization.
    pub nu2: f64,
    /// Encoder hidden layer sizes, input to embedding.
    pub hidden_units: Vec<usize>,
    /// Training epochs.
    pub n_iter: usize,
    /// Learning rate.
    pub xeta: f64,
    /// Edges per minibatch.
    pub n_batch: usize,
    /// RNG seed.
    pub seed: u64,
}

impl Default for SdneConfig {
    fn default() -> Self {
        Self {
            d: 128,
            beta: 5.0,
            alpha: 1e-5,
            nu1: 1e-6,
            nu2: 1e-6,
            hidden_units: vec![500, 300],
            n_iter: 30,
            xeta: 0.001,
            n_batch: 500,
            seed: 42,
        }
    }
}

/// One dense layer with sigmoid activation.
#[derive(Debug, Clone)]
struct Layer {
    /// out-by-in weights.
    w: DMatrix<f64>,
    b: DVector<f64>,
}

impl Layer {
    fn new<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        // Xavier-style init keeps sigmoid activations away from saturation.
        let scale = (6.0 / (inputs + outputs) as f64).sqrt();
        Self {
            w: DMatrix::from_fn(outputs, inputs, |_, _| rng.gen_range(-scale..scale)),
            b: DVector::zeros(outputs),
        }
    }

    fn forward(&self, input: &DVector<f64>) -> DVector<f64> {
        let mut z = &self.w * input + &self.b;
        z.apply(|v| *v = sigmoid(*v));
        z
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-layer gradient accumulator for one minibatch.
#[derive(Debug)]
struct LayerGrad {
    w: DMatrix<f64>,
    b: DVector<f64>,
}

impl LayerGrad {
    fn zeros_like(layer: &Layer) -> Self {
        Self {
            w: DMatrix::zeros(layer.w.nrows(), layer.w.ncols()),
            b: DVector::zeros(layer.b.len()),
        }
    }
}

/// SDNE autoencoder.
#[derive(Debug)]
pub struct Sdne {
    config: SdneConfig,
    embedding: Option<DMatrix<f64>>,
}

impl Sdne {
    pub fn new(config: SdneConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }

    fn build_layers<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Layer> {
        // Encoder n -> hidden... -> d, decoder mirrored back to n.
        let mut dims = vec![n];
        dims.extend_from_slice(&self.config.hidden_units);
        dims.push(self.config.d);
        let mut rev: Vec<usize> = dims.iter().rev().skip(1).copied().collect();
        dims.append(&mut rev);

        dims.windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], rng))
            .collect()
    }

    fn encoder_len(&self) -> usize {
        self.config.hidden_units.len() + 1
    }

    /// Forward pass; returns activations per layer, input first.
    fn forward(layers: &[Layer], x: &DVector<f64>) -> Vec<DVector<f64>> {
        let mut activations = Vec::with_capacity(layers.len() + 1);
        activations.push(x.clone());
        for layer in layers {
            let next = layer.forward(activations.last().expect("non-empty"));
            activations.push(next);
        }
        activations
    }

    /// Backward pass for one sample, accumulating into `grads`.
    ///
    /// `recon_delta` is the loss gradient at the output activation;
    /// `embedding_extra` is an additional gradient applied at the embedding
    /// activation (the first-order proximity term).
    fn backward(
        layers: &[Layer],
        activations: &[DVector<f64>],
        recon_delta: DVector<f64>,
        embedding_extra: Option<&DVector<f64>>,
        encoder_len: usize,
        grads: &mut [LayerGrad],
    ) {
        let mut delta = recon_delta;
        for l in (0..layers.len()).rev() {
            let out = &activations[l + 1];
            // Chain through this layer's sigmoid.
            let mut local = DVector::zeros(out.len());
            for i in 0..out.len() {
                local[i] = delta[i] * out[i] * (1.0 - out[i]);
            }

            grads[l].w += &local * activations[l].transpose();
            grads[l].b += &local;

            if l == 0 {
                break;
            }
            delta = layers[l].w.transpose() * local;
            // Inject the first-order term where the embedding lives.
            if l == encoder_len {
                if let Some(extra) = embedding_extra {
                    delta += extra;
                }
            }
        }
    }

    fn reconstruction_penalty(&self, x: &DVector<f64>) -> DVector<f64> {
        x.map(|v| if v > 0.0 { self.config.beta } else { 1.0 })
    }
}

impl EmbeddingMethod for Sdne {
    fn method_name(&self) -> &'static str {
        "sdne"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        let n = check_dimensions(graph, self.config.d)?;
        if self.config.n_batch == 0 {
            return Err(MethodError::InvalidDimension {
                d: self.config.n_batch,
                reason: "batch size must be positive".into(),
            });
        }

        let a = graph.adjacency_matrix();
        let rows: Vec<DVector<f64>> = (0..n).map(|i| a.row(i).transpose()).collect();
        let mut edges = graph.edges();
        if edges.is_empty() {
            return Err(MethodError::Numerical(
                "SDNE requires at least one edge".into(),
            ));
        }

        let mut rng = XorShiftRng::seed_from_u64(self.config.seed);
        let mut layers = self.build_layers(n, &mut rng);
        let encoder_len = self.encoder_len();

        for epoch in 0..self.config.n_iter {
            edges.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in edges.chunks(self.config.n_batch) {
                let mut grads: Vec<LayerGrad> =
                    layers.iter().map(LayerGrad::zeros_like).collect();

                for &(u, v, w) in batch {
                    let (u, v) = (u as usize, v as usize);
                    let acts_u = Self::forward(&layers, &rows[u]);
                    let acts_v = Self::forward(&layers, &rows[v]);

                    let y_u = &acts_u[encoder_len];
                    let y_v = &acts_v[encoder_len];
                    let diff = y_u - y_v;
                    epoch_loss += self.config.alpha * w * diff.norm_squared();

                    // d/dy of alpha * w * ||y_u - y_v||^2
                    let first_order_u = &diff * (2.0 * self.config.alpha * w);
                    let first_order_v = -&first_order_u;

                    for (acts, x, extra) in [
                        (&acts_u, &rows[u], &first_order_u),
                        (&acts_v, &rows[v], &first_order_v),
                    ] {
                        let x_hat = acts.last().expect("non-empty");
                        let penalty = self.reconstruction_penalty(x);
                        let mut recon_delta = DVector::zeros(n);
                        for i in 0..n {
                            let err = x_hat[i] - x[i];
                            epoch_loss += penalty[i] * err * err;
                            recon_delta[i] = 2.0 * penalty[i] * err;
                        }
                        Self::backward(
                            &layers,
                            acts,
                            recon_delta,
                            Some(extra),
                            encoder_len,
                            &mut grads,
                        );
                    }
                }

                let batch_scale = 1.0 / (2.0 * batch.len() as f64);
                for (layer, grad) in layers.iter_mut().zip(&grads) {
                    let mut step = &grad.w * batch_scale;
                    step += &layer.w * self.config.nu2;
                    step += layer.w.map(|v| v.signum()) * self.config.nu1;
                    layer.w -= step * self.config.xeta;
                    layer.b -= (&grad.b * batch_scale) * self.config.xeta;
                }
            }

            if (epoch + 1) % 5 == 0 {
                tracing::debug!("sdne epoch {}: loss {:.6}", epoch + 1, epoch_loss);
            }
        }

        let mut y = DMatrix::zeros(n, self.config.d);
        for (i, row) in rows.iter().enumerate() {
            let mut h = row.clone();
            for layer in &layers[..encoder_len] {
                h = layer.forward(&h);
            }
            y.set_row(i, &h.transpose());
        }

        Ok(self.embedding.insert(y))
    }

    fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::two_block_graph;

    fn quick_config() -> SdneConfig {
        SdneConfig {
            d: 4,
            hidden_units: vec![16],
            n_iter: 3,
            n_batch: 8,
            ..Default::default()
        }
    }

    #[test]
    fn test_embedding_shape() {
        let graph = two_block_graph();
        let mut model = Sdne::new(quick_config());
        let y = model.learn_embedding(&graph).unwrap();
        assert_eq!(y.nrows(), graph.node_count());
        assert_eq!(y.ncols(), 4);
        assert!(y.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_layer_symmetry() {
        let model = Sdne::new(quick_config());
        let mut rng = XorShiftRng::seed_from_u64(1);
        let layers = model.build_layers(24, &mut rng);
        // 24 -> 16 -> 4 -> 16 -> 24
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].w.shape(), (16, 24));
        assert_eq!(layers[1].w.shape(), (4, 16));
        assert_eq!(layers[2].w.shape(), (16, 4));
        assert_eq!(layers[3].w.shape(), (24, 16));
    }

    #[test]
    fn test_sigmoid_range() {
        assert!(sigmoid(0.0) == 0.5);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_deterministic_under_seed() {
        let graph = two_block_graph();
        let mut a = Sdne::new(quick_config());
        let mut b = Sdne::new(quick_config());
        assert_eq!(
            a.learn_embedding(&graph).unwrap(),
            b.learn_embedding(&graph).unwrap()
        );
    }

    #[test]
    fn test_edgeless_graph_rejected() {
        let mut graph = emgraph_core::Graph::new();
        graph.add_node(0);
        graph.add_node(1);
        let mut model = Sdne::new(quick_config());
        assert!(model.learn_embedding(&graph).is_err());
    }
}
