//! Genetic operators on neural-network controllers.
//!
//! These are the building blocks used by
//! [`GeneticAlgorithm::advance_generation`](crate::genetic::GeneticAlgorithm::advance_generation):
//!
//! - **Selection**: [`tournament_select`] picks the fittest of `k` distinct random entrants
//! - **Crossover**: [`crossover`] swaps a column prefix of every weight matrix
//! - **Mutation**: [`mutate`] adds Gaussian noise to whole weight matrices
//!
//! Children are always built from clones of their parents; no operator writes to a
//! parent's storage.

use ndarray::{Zip, s};
use rand::{Rng, distr::Distribution as _};
use rand_distr::Normal;
use snakevo_evaluator::network::NeuralNetwork;

/// Selects an index using tournament selection.
///
/// Draws `tournament_size` distinct indices uniformly and returns the one with
/// the highest fitness. With `tournament_size == 1` this is uniform selection.
///
/// # Panics
///
/// Panics if `fitness` is empty or `tournament_size` is 0.
pub fn tournament_select<R>(fitness: &[f64], tournament_size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    assert!(!fitness.is_empty());
    rand::seq::index::sample(rng, fitness.len(), tournament_size.min(fitness.len()))
        .into_iter()
        .max_by(|&a, &b| fitness[a].total_cmp(&fitness[b]))
        .unwrap()
}

/// Single-point column crossover, applied independently to every weight matrix.
///
/// For each layer a point `p` is drawn uniformly from `[0, input_size - 1]` and the
/// column block `[:, :p]` is exchanged between the two children. Biases stay with
/// their own parent.
///
/// # Panics
///
/// Panics if the parents have different layer sizes.
pub fn crossover<R>(
    parent_a: &NeuralNetwork,
    parent_b: &NeuralNetwork,
    rng: &mut R,
) -> (NeuralNetwork, NeuralNetwork)
where
    R: Rng + ?Sized,
{
    assert_eq!(parent_a.layer_sizes(), parent_b.layer_sizes());
    let mut child_a = parent_a.clone();
    let mut child_b = parent_b.clone();
    for (layer_a, layer_b) in child_a.layers_mut().iter_mut().zip(child_b.layers_mut()) {
        let point = rng.random_range(0..layer_a.input_size());
        let mut weights_a = layer_a.weights_mut();
        let mut weights_b = layer_b.weights_mut();
        Zip::from(weights_a.slice_mut(s![.., ..point]))
            .and(weights_b.slice_mut(s![.., ..point]))
            .for_each(std::mem::swap);
    }
    (child_a, child_b)
}

/// Gaussian mutation, all-or-nothing per weight matrix.
///
/// Each weight matrix is perturbed with probability `rate` by adding independent
/// `noise` samples to all of its entries. Biases are not mutated. A `rate` of 0
/// consumes no randomness and leaves the network untouched.
pub fn mutate<R>(network: &mut NeuralNetwork, rate: f64, noise: &Normal<f32>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    if rate <= 0.0 {
        return;
    }
    for layer in network.layers_mut() {
        if rng.random_bool(rate.min(1.0)) {
            layer
                .weights_mut()
                .mapv_inplace(|w| w + noise.sample(&mut *rng));
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn network(seed: u64) -> NeuralNetwork {
        let mut rng = Pcg32::seed_from_u64(seed);
        NeuralNetwork::random(24, &[16, 16], 4, &mut rng).unwrap()
    }

    #[test]
    fn test_crossover_preserves_shapes_and_biases() {
        let a = network(1);
        let b = network(2);
        let mut rng = Pcg32::seed_from_u64(9);
        let (c1, c2) = crossover(&a, &b, &mut rng);

        for child in [&c1, &c2] {
            assert_eq!(child.layer_sizes(), a.layer_sizes());
            for (cl, al) in child.layers().iter().zip(a.layers()) {
                assert_eq!(cl.weights().dim(), al.weights().dim());
            }
        }
        for ((l1, l2), (la, lb)) in c1
            .layers()
            .iter()
            .zip(c2.layers())
            .zip(a.layers().iter().zip(b.layers()))
        {
            assert_eq!(l1.biases(), la.biases());
            assert_eq!(l2.biases(), lb.biases());
        }
    }

    #[test]
    fn test_crossover_swaps_column_prefix() {
        let a = network(3);
        let b = network(4);
        let mut rng = Pcg32::seed_from_u64(5);
        let (c1, c2) = crossover(&a, &b, &mut rng);

        for (layer, (l1, l2)) in c1.layers().iter().zip(c2.layers()).enumerate() {
            let (wa, wb) = (a.layers()[layer].weights(), b.layers()[layer].weights());
            let (w1, w2) = (l1.weights(), l2.weights());
            let point = (0..wa.ncols())
                .find(|&col| w1.column(col) == wa.column(col))
                .unwrap_or(wa.ncols());
            for col in 0..wa.ncols() {
                if col < point {
                    assert_eq!(w1.column(col), wb.column(col));
                    assert_eq!(w2.column(col), wa.column(col));
                } else {
                    assert_eq!(w1.column(col), wa.column(col));
                    assert_eq!(w2.column(col), wb.column(col));
                }
            }
        }
    }

    #[test]
    fn test_crossover_does_not_touch_parents() {
        let a = network(6);
        let b = network(7);
        let (a_before, b_before) = (a.clone(), b.clone());
        let mut rng = Pcg32::seed_from_u64(8);
        let (mut c1, _) = crossover(&a, &b, &mut rng);
        c1.layers_mut()[0].weights_mut().fill(0.0);
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    fn test_mutate_rate_zero_is_noop() {
        let mut net = network(10);
        let before = net.clone();
        let noise = Normal::new(0.0, 0.1).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        mutate(&mut net, 0.0, &noise, &mut rng);
        assert_eq!(net, before);
    }

    #[test]
    fn test_mutate_rate_one_changes_every_matrix() {
        let mut net = network(11);
        let before = net.clone();
        let noise = Normal::new(0.0, 0.1).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        mutate(&mut net, 1.0, &noise, &mut rng);
        for (after, before) in net.layers().iter().zip(before.layers()) {
            assert_eq!(after.weights().dim(), before.weights().dim());
            assert!(
                after
                    .weights()
                    .iter()
                    .zip(before.weights())
                    .any(|(x, y)| x != y)
            );
            assert_eq!(after.biases(), before.biases());
        }
    }

    #[test]
    fn test_tournament_picks_best_entrant() {
        let fitness = [1.0, 5.0, 3.0, 4.0];
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(tournament_select(&fitness, 4, &mut rng), 1);
        }
    }

    #[test]
    fn test_tournament_size_one_is_uniform() {
        let fitness: Vec<f64> = (0..10).map(f64::from).collect();
        let mut rng = Pcg32::seed_from_u64(2024);
        let draws = 100_000;
        let mut counts = [0usize; 10];
        for _ in 0..draws {
            counts[tournament_select(&fitness, 1, &mut rng)] += 1;
        }
        // expected 10_000 each; 5 sigma is roughly +-475
        for count in counts {
            assert!((9_500..=10_500).contains(&count), "{counts:?}");
        }
    }
}
