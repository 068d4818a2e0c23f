//! Loaded records plus tree rendering under a [`Projection`].

use super::rules::{relations, Cardinality, Projection, Relation};
use crate::model::{EntityKind, Mission, Planet, Scientist};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The records one request works with, keyed by id so every collection renders id-ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    scientists: BTreeMap<i64, Scientist>,
    planets: BTreeMap<i64, Planet>,
    missions: BTreeMap<i64, Mission>,
}

fn scalars<T: Serialize>(record: &T) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scientist(&mut self, scientist: Scientist) {
        self.scientists.insert(scientist.id(), scientist);
    }

    pub fn add_planet(&mut self, planet: Planet) {
        self.planets.insert(planet.id(), planet);
    }

    pub fn add_mission(&mut self, mission: Mission) {
        self.missions.insert(mission.id(), mission);
    }

    pub fn scientist(&self, id: i64) -> Option<&Scientist> {
        self.scientists.get(&id)
    }

    pub fn planet(&self, id: i64) -> Option<&Planet> {
        self.planets.get(&id)
    }

    pub fn mission(&self, id: i64) -> Option<&Mission> {
        self.missions.get(&id)
    }

    pub fn ids(&self, kind: EntityKind) -> Vec<i64> {
        match kind {
            EntityKind::Scientist => self.scientists.keys().copied().collect(),
            EntityKind::Planet => self.planets.keys().copied().collect(),
            EntityKind::Mission => self.missions.keys().copied().collect(),
        }
    }

    fn missions_of(&self, kind: EntityKind, id: i64) -> impl Iterator<Item = &Mission> {
        self.missions.values().filter(move |m| match kind {
            EntityKind::Scientist => m.scientist_id() == id,
            EntityKind::Planet => m.planet_id() == id,
            EntityKind::Mission => false,
        })
    }

    /// Renders the `projection.root()` record with this id, or `None` if it is not loaded.
    pub fn render(&self, id: i64, projection: &Projection) -> Option<Value> {
        let kind = projection.root();
        let mut out = match kind {
            EntityKind::Scientist => scalars(self.scientist(id)?),
            EntityKind::Planet => scalars(self.planet(id)?),
            EntityKind::Mission => scalars(self.mission(id)?),
        };
        for rel in relations(kind) {
            if projection.is_excluded(*rel) {
                continue;
            }
            let child = projection.descend(*rel);
            let value = match rel.cardinality() {
                Cardinality::Many => Value::Array(
                    self.missions_of(kind, id)
                        .filter_map(|m| self.render(m.id(), &child))
                        .collect(),
                ),
                Cardinality::One => self
                    .parent_id(kind, id, *rel)
                    .and_then(|parent| self.render(parent, &child))
                    .unwrap_or(Value::Null),
            };
            out.insert(rel.name().to_string(), value);
        }
        Some(Value::Object(out))
    }

    /// Every loaded record of the root kind, id-ascending.
    pub fn render_all(&self, projection: &Projection) -> Vec<Value> {
        self.ids(projection.root())
            .into_iter()
            .filter_map(|id| self.render(id, projection))
            .collect()
    }

    fn parent_id(&self, kind: EntityKind, id: i64, rel: Relation) -> Option<i64> {
        let mission = match kind {
            EntityKind::Mission => self.mission(id)?,
            _ => return None,
        };
        match rel {
            Relation::Scientist => Some(mission.scientist_id()),
            Relation::Planet => Some(mission.planet_id()),
            Relation::Missions => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{body_to_map, NewMission, NewPlanet, NewScientist};
    use serde_json::json;

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add_scientist(
            NewScientist::create(&body_to_map(json!({"name": "Ada", "field_of_study": "Astrophysics"})).unwrap())
                .unwrap()
                .with_id(1),
        );
        g.add_planet(
            NewPlanet::create(
                &body_to_map(json!({"name": "Mars", "distance_from_earth": 225, "nearest_star": "Sun"})).unwrap(),
            )
            .unwrap()
            .with_id(1),
        );
        for (id, name) in [(5, "Mars Two"), (2, "Mars One")] {
            g.add_mission(
                NewMission::create(
                    &body_to_map(json!({"name": name, "scientist_id": 1, "planet_id": 1})).unwrap(),
                )
                .unwrap()
                .with_id(id),
            );
        }
        g
    }

    #[test]
    fn test_scientist_default_prunes_back_reference() {
        let out = sample().render(1, &Projection::new(EntityKind::Scientist)).unwrap();
        assert_eq!(
            out,
            json!({
                "id": 1,
                "name": "Ada",
                "field_of_study": "Astrophysics",
                "missions": [
                    {"id": 2, "name": "Mars One", "scientist_id": 1, "planet_id": 1,
                     "planet": {"id": 1, "name": "Mars", "distance_from_earth": 225, "nearest_star": "Sun"}},
                    {"id": 5, "name": "Mars Two", "scientist_id": 1, "planet_id": 1,
                     "planet": {"id": 1, "name": "Mars", "distance_from_earth": 225, "nearest_star": "Sun"}}
                ]
            })
        );
    }

    #[test]
    fn test_mission_default_expands_both_parents_without_their_missions() {
        let out = sample().render(2, &Projection::new(EntityKind::Mission)).unwrap();
        assert_eq!(out["scientist"], json!({"id": 1, "name": "Ada", "field_of_study": "Astrophysics"}));
        assert!(out["planet"].get("missions").is_none());
    }

    #[test]
    fn test_scalar_order_is_declaration_order() {
        let out = sample().render(1, &Projection::new(EntityKind::Planet)).unwrap();
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "distance_from_earth", "nearest_star", "missions"]);
    }

    #[test]
    fn test_missing_collection_renders_empty() {
        let mut g = Graph::new();
        g.add_scientist(
            NewScientist::create(&body_to_map(json!({"name": "Vera", "field_of_study": "Galaxies"})).unwrap())
                .unwrap()
                .with_id(3),
        );
        let out = g.render(3, &Projection::new(EntityKind::Scientist)).unwrap();
        assert_eq!(out["missions"], json!([]));
        assert!(g.render(4, &Projection::new(EntityKind::Scientist)).is_none());
    }

    #[test]
    fn test_unloaded_parent_renders_null() {
        let mut g = sample();
        g.planets.clear();
        let out = g.render(2, &Projection::new(EntityKind::Mission)).unwrap();
        assert_eq!(out["planet"], Value::Null);
    }

    #[test]
    fn test_excluded_relation_is_omitted() {
        let projection = Projection::new(EntityKind::Scientist).exclude_rule("missions").unwrap();
        let out = sample().render_all(&projection);
        assert_eq!(out, vec![json!({"id": 1, "name": "Ada", "field_of_study": "Astrophysics"})]);
    }
}
