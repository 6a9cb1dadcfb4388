use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snakevo_evaluator::network::NeuralNetwork;

/// A trained controller as written by `snakevo train`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControllerModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the network was taken from
    pub generation: usize,
    /// Raw fitness of the network in that generation
    pub final_fitness: f64,
    pub network: NeuralNetwork,
}
