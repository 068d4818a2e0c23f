use super::fields::{collect, integer, non_empty, reject_unknown, required_string, string, FieldMap};
use crate::error::ValidationError;
use serde::Serialize;

const FIELDS: &[&str] = &["name", "distance_from_earth", "nearest_star"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Planet {
    id: i64,
    name: String,
    distance_from_earth: i64,
    nearest_star: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPlanet {
    pub(crate) name: String,
    pub(crate) distance_from_earth: i64,
    pub(crate) nearest_star: String,
}

impl NewPlanet {
    pub fn create(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let name = collect(&mut errors, required_string("name", fields.get("name"), "planet name"));
        let distance = collect(
            &mut errors,
            integer("distance_from_earth", fields.get("distance_from_earth")),
        );
        let nearest_star = collect(&mut errors, string("nearest_star", fields.get("nearest_star")));
        match (name, distance, nearest_star) {
            (Some(name), Some(distance_from_earth), Some(nearest_star)) if errors.is_empty() => Ok(NewPlanet {
                name,
                distance_from_earth,
                nearest_star,
            }),
            _ => Err(errors),
        }
    }

    pub fn with_id(self, id: i64) -> Planet {
        Planet {
            id,
            name: self.name,
            distance_from_earth: self.distance_from_earth,
            nearest_star: self.nearest_star,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanetPatch {
    pub name: Option<String>,
    pub distance_from_earth: Option<i64>,
    pub nearest_star: Option<String>,
}

impl PlanetPatch {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let mut patch = PlanetPatch::default();
        if fields.contains_key("name") {
            patch.name = collect(&mut errors, required_string("name", fields.get("name"), "planet name"));
        }
        if fields.contains_key("distance_from_earth") {
            patch.distance_from_earth = collect(
                &mut errors,
                integer("distance_from_earth", fields.get("distance_from_earth")),
            );
        }
        if fields.contains_key("nearest_star") {
            patch.nearest_star = collect(&mut errors, string("nearest_star", fields.get("nearest_star")));
        }
        errors.into_result()?;
        Ok(patch)
    }
}

impl Planet {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distance_from_earth(&self) -> i64 {
        self.distance_from_earth
    }

    pub fn nearest_star(&self) -> &str {
        &self.nearest_star
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        non_empty("name", &name, "planet name")?;
        self.name = name;
        Ok(())
    }

    pub fn apply(&mut self, patch: &PlanetPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.set_name(name.as_str())?;
        }
        if let Some(distance) = patch.distance_from_earth {
            next.distance_from_earth = distance;
        }
        if let Some(star) = &patch.nearest_star {
            next.nearest_star = star.clone();
        }
        *self = next;
        Ok(())
    }
}
