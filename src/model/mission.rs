use super::fields::{collect, foreign_key, non_empty, reject_unknown, required_string, FieldMap};
use crate::error::ValidationError;
use serde::Serialize;

const FIELDS: &[&str] = &["name", "scientist_id", "planet_id"];

/// Association between one scientist and one planet. Both keys are set on every instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Mission {
    id: i64,
    name: String,
    scientist_id: i64,
    planet_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMission {
    pub(crate) name: String,
    pub(crate) scientist_id: i64,
    pub(crate) planet_id: i64,
}

impl NewMission {
    pub fn create(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let name = collect(&mut errors, required_string("name", fields.get("name"), "mission name"));
        let scientist_id = collect(
            &mut errors,
            foreign_key("scientist_id", fields.get("scientist_id"), "scientist id"),
        );
        let planet_id = collect(&mut errors, foreign_key("planet_id", fields.get("planet_id"), "planet id"));
        match (name, scientist_id, planet_id) {
            (Some(name), Some(scientist_id), Some(planet_id)) if errors.is_empty() => Ok(NewMission {
                name,
                scientist_id,
                planet_id,
            }),
            _ => Err(errors),
        }
    }

    pub fn scientist_id(&self) -> i64 {
        self.scientist_id
    }

    pub fn planet_id(&self) -> i64 {
        self.planet_id
    }

    pub fn with_id(self, id: i64) -> Mission {
        Mission {
            id,
            name: self.name,
            scientist_id: self.scientist_id,
            planet_id: self.planet_id,
        }
    }
}

/// Keys may be reassigned but never cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissionPatch {
    pub name: Option<String>,
    pub scientist_id: Option<i64>,
    pub planet_id: Option<i64>,
}

impl MissionPatch {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let mut patch = MissionPatch::default();
        if fields.contains_key("name") {
            patch.name = collect(&mut errors, required_string("name", fields.get("name"), "mission name"));
        }
        if fields.contains_key("scientist_id") {
            patch.scientist_id = collect(
                &mut errors,
                foreign_key("scientist_id", fields.get("scientist_id"), "scientist id"),
            );
        }
        if fields.contains_key("planet_id") {
            patch.planet_id = collect(&mut errors, foreign_key("planet_id", fields.get("planet_id"), "planet id"));
        }
        errors.into_result()?;
        Ok(patch)
    }
}

impl Mission {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scientist_id(&self) -> i64 {
        self.scientist_id
    }

    pub fn planet_id(&self) -> i64 {
        self.planet_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        non_empty("name", &name, "mission name")?;
        self.name = name;
        Ok(())
    }

    pub fn apply(&mut self, patch: &MissionPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.set_name(name.as_str())?;
        }
        if let Some(id) = patch.scientist_id {
            next.scientist_id = id;
        }
        if let Some(id) = patch.planet_id {
            next.planet_id = id;
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::body_to_map;
    use serde_json::json;

    #[test]
    fn test_create_requires_both_parents() {
        let fields = body_to_map(json!({"name": "Mars One", "scientist_id": 1})).unwrap();
        let err = NewMission::create(&fields).unwrap_err();
        assert_eq!(err.messages(), vec!["planet_id: planet id is required"]);

        let fields = body_to_map(json!({"name": "", "scientist_id": null, "planet_id": 2})).unwrap();
        let err = NewMission::create(&fields).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn test_patch_cannot_clear_foreign_keys() {
        let fields = body_to_map(json!({"planet_id": null})).unwrap();
        assert!(MissionPatch::from_fields(&fields).is_err());

        let mut mission = NewMission::create(
            &body_to_map(json!({"name": "Mars One", "scientist_id": 1, "planet_id": 2})).unwrap(),
        )
        .unwrap()
        .with_id(7);
        let patch = MissionPatch::from_fields(&body_to_map(json!({"planet_id": 3})).unwrap()).unwrap();
        mission.apply(&patch).unwrap();
        assert_eq!(mission.planet_id(), 3);
        assert_eq!(mission.scientist_id(), 1);
    }
}
