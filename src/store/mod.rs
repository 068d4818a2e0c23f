//! Persistence. Every [`Store`] call is one transaction: its writes are all visible afterwards or
//! none are, and deleting a scientist or planet removes its missions in the same transaction.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, ensure_schema, PgStore};

use crate::error::AppError;
use crate::model::{EntityKind, Mission, NewMission, NewPlanet, NewScientist, Planet, Scientist, ScientistPatch};
use crate::serialize::Graph;
use async_trait::async_trait;
use std::str::FromStr;

#[async_trait]
pub trait Store: Send + Sync {
    /// All scientists, id-ascending.
    async fn scientists(&self) -> Result<Vec<Scientist>, AppError>;

    async fn scientist(&self, id: i64) -> Result<Option<Scientist>, AppError>;

    /// The scientist, its missions and the planets those missions visit.
    async fn scientist_graph(&self, id: i64) -> Result<Option<Graph>, AppError>;

    async fn insert_scientist(&self, new: NewScientist) -> Result<Scientist, AppError>;

    /// `None` when no scientist has this id.
    async fn update_scientist(&self, id: i64, patch: &ScientistPatch) -> Result<Option<Scientist>, AppError>;

    /// Returns the number of missions removed with the scientist, `None` when it does not exist.
    async fn delete_scientist(&self, id: i64) -> Result<Option<u64>, AppError>;

    async fn planets(&self) -> Result<Vec<Planet>, AppError>;

    async fn insert_planet(&self, new: NewPlanet) -> Result<Planet, AppError>;

    async fn delete_planet(&self, id: i64) -> Result<Option<u64>, AppError>;

    /// Fails with a validation error when either key does not reference an existing row.
    /// The returned graph holds the mission and both parents.
    async fn insert_mission(&self, new: NewMission) -> Result<Graph, AppError>;

    /// The mission and both parents.
    async fn mission_graph(&self, id: i64) -> Result<Option<Graph>, AppError>;

    async fn count(&self, kind: EntityKind) -> Result<u64, AppError>;
}

/// Which backend to run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("invalid store backend: {} (expected postgres or memory)", s)),
        }
    }
}

pub(crate) fn missing_parent(field: &str, kind: EntityKind, id: i64) -> AppError {
    AppError::Validation(crate::error::ValidationError::field(
        field,
        format!("no {} with id {}", kind.name().to_lowercase(), id),
    ))
}

pub(crate) fn mission_graph_of(mission: Mission, scientist: Scientist, planet: Planet) -> Graph {
    let mut graph = Graph::new();
    graph.add_mission(mission);
    graph.add_scientist(scientist);
    graph.add_planet(planet);
    graph
}
