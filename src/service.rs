//! Request-level operations: validate, run one store call, render with the endpoint's projection.

use crate::error::AppError;
use crate::model::{EntityKind, FieldMap, NewMission, NewPlanet, NewScientist, ScientistPatch};
use crate::serialize::{Graph, Projection, Relation, RuleError};
use crate::store::Store;
use serde_json::Value;
use std::sync::Arc;

/// Projections used by the HTTP surface.
pub mod views {
    use super::*;

    /// List and write responses never expand the scientist's missions.
    pub fn scientist_summary() -> Result<Projection, RuleError> {
        Projection::new(EntityKind::Scientist).exclude(&[Relation::Missions])
    }

    pub fn scientist_detail() -> Projection {
        Projection::new(EntityKind::Scientist)
    }

    pub fn planet_summary() -> Result<Projection, RuleError> {
        Projection::new(EntityKind::Planet).exclude(&[Relation::Missions])
    }

    pub fn mission_detail() -> Projection {
        Projection::new(EntityKind::Mission)
    }
}

#[derive(Clone)]
pub struct MissionService {
    store: Arc<dyn Store>,
}

fn rendered(graph: &Graph, id: i64, projection: &Projection) -> Result<Value, AppError> {
    graph
        .render(id, projection)
        .ok_or(AppError::NotFound(projection.root()))
}

impl MissionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        MissionService { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn list_scientists(&self) -> Result<Vec<Value>, AppError> {
        let mut graph = Graph::new();
        for s in self.store.scientists().await? {
            graph.add_scientist(s);
        }
        Ok(graph.render_all(&views::scientist_summary()?))
    }

    pub async fn create_scientist(&self, fields: &FieldMap) -> Result<Value, AppError> {
        let new = NewScientist::create(fields)?;
        let scientist = self.store.insert_scientist(new).await?;
        let id = scientist.id();
        let mut graph = Graph::new();
        graph.add_scientist(scientist);
        rendered(&graph, id, &views::scientist_summary()?)
    }

    pub async fn scientist(&self, id: i64) -> Result<Value, AppError> {
        let graph = self
            .store
            .scientist_graph(id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Scientist))?;
        rendered(&graph, id, &views::scientist_detail())
    }

    /// The id is resolved before the body is looked at, so an unknown id is a 404 whatever was sent.
    pub async fn update_scientist(&self, id: i64, body: Result<FieldMap, AppError>) -> Result<Value, AppError> {
        if self.store.scientist(id).await?.is_none() {
            return Err(AppError::NotFound(EntityKind::Scientist));
        }
        let patch = ScientistPatch::from_fields(&body?)?;
        let scientist = self
            .store
            .update_scientist(id, &patch)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Scientist))?;
        let mut graph = Graph::new();
        graph.add_scientist(scientist);
        rendered(&graph, id, &views::scientist_summary()?)
    }

    /// Returns how many missions went with the scientist.
    pub async fn delete_scientist(&self, id: i64) -> Result<u64, AppError> {
        self.store
            .delete_scientist(id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Scientist))
    }

    pub async fn list_planets(&self) -> Result<Vec<Value>, AppError> {
        let mut graph = Graph::new();
        for p in self.store.planets().await? {
            graph.add_planet(p);
        }
        Ok(graph.render_all(&views::planet_summary()?))
    }

    pub async fn create_planet(&self, fields: &FieldMap) -> Result<Value, AppError> {
        let new = NewPlanet::create(fields)?;
        let planet = self.store.insert_planet(new).await?;
        let id = planet.id();
        let mut graph = Graph::new();
        graph.add_planet(planet);
        rendered(&graph, id, &views::planet_summary()?)
    }

    pub async fn delete_planet(&self, id: i64) -> Result<u64, AppError> {
        self.store
            .delete_planet(id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Planet))
    }

    pub async fn create_mission(&self, fields: &FieldMap) -> Result<Value, AppError> {
        let new = NewMission::create(fields)?;
        let graph = self.store.insert_mission(new).await?;
        let id = graph
            .ids(EntityKind::Mission)
            .first()
            .copied()
            .ok_or(AppError::NotFound(EntityKind::Mission))?;
        rendered(&graph, id, &views::mission_detail())
    }

    pub async fn mission(&self, id: i64) -> Result<Value, AppError> {
        let graph = self
            .store
            .mission_graph(id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Mission))?;
        rendered(&graph, id, &views::mission_detail())
    }
}
