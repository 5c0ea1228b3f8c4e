//! Pairwise correlation, ranking, and graph projection.

pub mod graph;
pub mod matrix;
pub mod ranking;

pub use graph::{relationship_graph, Edge, Strength};
pub use matrix::CorrelationMatrix;
pub use ranking::{top_pairs, CorrelationPair};
