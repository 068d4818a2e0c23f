//! Tree rendering of entities with cycle-free relationship expansion.

mod graph;
mod rules;

pub use graph::Graph;
pub use rules::{relations, Cardinality, Projection, Relation, RuleError};
