//! In-memory store for tests and `STORE_BACKEND=memory`.
//!
//! Each operation holds the write lock for its whole duration and checks everything before it
//! mutates, which gives the same all-or-nothing visibility as a database transaction.

use super::{mission_graph_of, missing_parent, Store};
use crate::error::AppError;
use crate::model::{EntityKind, Mission, NewMission, NewPlanet, NewScientist, Planet, Scientist, ScientistPatch};
use crate::serialize::Graph;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    scientists: BTreeMap<i64, Scientist>,
    planets: BTreeMap<i64, Planet>,
    missions: BTreeMap<i64, Mission>,
    last_scientist_id: i64,
    last_planet_id: i64,
    last_mission_id: i64,
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

impl Tables {
    fn scientist_graph(&self, id: i64) -> Option<Graph> {
        let scientist = self.scientists.get(&id)?;
        let mut graph = Graph::new();
        graph.add_scientist(scientist.clone());
        for mission in self.missions.values().filter(|m| m.scientist_id() == id) {
            if let Some(planet) = self.planets.get(&mission.planet_id()) {
                graph.add_planet(planet.clone());
            }
            graph.add_mission(mission.clone());
        }
        Some(graph)
    }

    fn mission_graph(&self, id: i64) -> Option<Graph> {
        let mission = self.missions.get(&id)?;
        let scientist = self.scientists.get(&mission.scientist_id())?;
        let planet = self.planets.get(&mission.planet_id())?;
        Some(mission_graph_of(mission.clone(), scientist.clone(), planet.clone()))
    }

    fn remove_missions(&mut self, keep: impl Fn(&Mission) -> bool) -> u64 {
        let before = self.missions.len();
        self.missions.retain(|_, m| keep(m));
        (before - self.missions.len()) as u64
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|e| AppError::Store(format!("failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|e| AppError::Store(format!("failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn scientists(&self) -> Result<Vec<Scientist>, AppError> {
        Ok(self.read()?.scientists.values().cloned().collect())
    }

    async fn scientist(&self, id: i64) -> Result<Option<Scientist>, AppError> {
        Ok(self.read()?.scientists.get(&id).cloned())
    }

    async fn scientist_graph(&self, id: i64) -> Result<Option<Graph>, AppError> {
        Ok(self.read()?.scientist_graph(id))
    }

    async fn insert_scientist(&self, new: NewScientist) -> Result<Scientist, AppError> {
        let mut tables = self.write()?;
        let scientist = new.with_id(next_id(&mut tables.last_scientist_id));
        tables.scientists.insert(scientist.id(), scientist.clone());
        Ok(scientist)
    }

    async fn update_scientist(&self, id: i64, patch: &ScientistPatch) -> Result<Option<Scientist>, AppError> {
        let mut tables = self.write()?;
        let Some(scientist) = tables.scientists.get_mut(&id) else {
            return Ok(None);
        };
        scientist.apply(patch)?;
        Ok(Some(scientist.clone()))
    }

    async fn delete_scientist(&self, id: i64) -> Result<Option<u64>, AppError> {
        let mut tables = self.write()?;
        if tables.scientists.remove(&id).is_none() {
            return Ok(None);
        }
        let removed = tables.remove_missions(|m| m.scientist_id() != id);
        tracing::info!(scientist_id = id, missions = removed, "deleted scientist");
        Ok(Some(removed))
    }

    async fn planets(&self) -> Result<Vec<Planet>, AppError> {
        Ok(self.read()?.planets.values().cloned().collect())
    }

    async fn insert_planet(&self, new: NewPlanet) -> Result<Planet, AppError> {
        let mut tables = self.write()?;
        let planet = new.with_id(next_id(&mut tables.last_planet_id));
        tables.planets.insert(planet.id(), planet.clone());
        Ok(planet)
    }

    async fn delete_planet(&self, id: i64) -> Result<Option<u64>, AppError> {
        let mut tables = self.write()?;
        if tables.planets.remove(&id).is_none() {
            return Ok(None);
        }
        let removed = tables.remove_missions(|m| m.planet_id() != id);
        tracing::info!(planet_id = id, missions = removed, "deleted planet");
        Ok(Some(removed))
    }

    async fn insert_mission(&self, new: NewMission) -> Result<Graph, AppError> {
        let mut tables = self.write()?;
        let scientist = tables
            .scientists
            .get(&new.scientist_id())
            .cloned()
            .ok_or_else(|| missing_parent("scientist_id", EntityKind::Scientist, new.scientist_id()))?;
        let planet = tables
            .planets
            .get(&new.planet_id())
            .cloned()
            .ok_or_else(|| missing_parent("planet_id", EntityKind::Planet, new.planet_id()))?;
        let mission = new.with_id(next_id(&mut tables.last_mission_id));
        tables.missions.insert(mission.id(), mission.clone());
        Ok(mission_graph_of(mission, scientist, planet))
    }

    async fn mission_graph(&self, id: i64) -> Result<Option<Graph>, AppError> {
        Ok(self.read()?.mission_graph(id))
    }

    async fn count(&self, kind: EntityKind) -> Result<u64, AppError> {
        let tables = self.read()?;
        let n = match kind {
            EntityKind::Scientist => tables.scientists.len(),
            EntityKind::Planet => tables.planets.len(),
            EntityKind::Mission => tables.missions.len(),
        };
        Ok(n as u64)
    }
}
