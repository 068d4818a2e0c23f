use super::fields::{collect, non_empty, reject_unknown, required_string, FieldMap};
use crate::error::ValidationError;
use serde::Serialize;

const FIELDS: &[&str] = &["name", "field_of_study"];

fn validate_name(name: &str) -> Result<(), ValidationError> {
    non_empty("name", name, "scientist name")
}

fn validate_field_of_study(field_of_study: &str) -> Result<(), ValidationError> {
    non_empty("field_of_study", field_of_study, "field of study")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Scientist {
    id: i64,
    name: String,
    field_of_study: String,
}

/// A validated scientist that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewScientist {
    pub(crate) name: String,
    pub(crate) field_of_study: String,
}

impl NewScientist {
    pub fn create(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let name = collect(&mut errors, required_string("name", fields.get("name"), "scientist name"));
        let field_of_study = collect(
            &mut errors,
            required_string("field_of_study", fields.get("field_of_study"), "field of study"),
        );
        match (name, field_of_study) {
            (Some(name), Some(field_of_study)) if errors.is_empty() => Ok(NewScientist { name, field_of_study }),
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_of_study(&self) -> &str {
        &self.field_of_study
    }

    pub fn with_id(self, id: i64) -> Scientist {
        Scientist {
            id,
            name: self.name,
            field_of_study: self.field_of_study,
        }
    }
}

/// Allow-listed partial update. Only fields present in the request are set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScientistPatch {
    pub name: Option<String>,
    pub field_of_study: Option<String>,
}

impl ScientistPatch {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        reject_unknown(fields, FIELDS)?;
        let mut errors = ValidationError::default();
        let mut patch = ScientistPatch::default();
        if fields.contains_key("name") {
            patch.name = collect(&mut errors, required_string("name", fields.get("name"), "scientist name"));
        }
        if fields.contains_key("field_of_study") {
            patch.field_of_study = collect(
                &mut errors,
                required_string("field_of_study", fields.get("field_of_study"), "field of study"),
            );
        }
        errors.into_result()?;
        Ok(patch)
    }
}

impl Scientist {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_of_study(&self) -> &str {
        &self.field_of_study
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_field_of_study(&mut self, field_of_study: impl Into<String>) -> Result<(), ValidationError> {
        let field_of_study = field_of_study.into();
        validate_field_of_study(&field_of_study)?;
        self.field_of_study = field_of_study;
        Ok(())
    }

    /// Applies every field of `patch` or none of them.
    pub fn apply(&mut self, patch: &ScientistPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.set_name(name.as_str())?;
        }
        if let Some(field_of_study) = &patch.field_of_study {
            next.set_field_of_study(field_of_study.as_str())?;
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

    fn fields(v: serde_json::Value) -> FieldMap {
        body_to_map(v).unwrap()
    }

    #[test]
    fn test_create_requires_name_and_field_of_study() {
        let ok = NewScientist::create(&fields(json!({"name": "Ada", "field_of_study": "Astrophysics"}))).unwrap();
        assert_eq!(ok.name(), "Ada");

        let err = NewScientist::create(&fields(json!({"name": "", "field_of_study": null}))).unwrap_err();
        let failed: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(failed, vec!["name", "field_of_study"]);
    }

    #[test]
    fn test_create_rejects_unknown_fields() {
        let err = NewScientist::create(&fields(json!({"name": "Ada", "field_of_study": "Optics", "age": 36})))
            .unwrap_err();
        assert_eq!(err.errors[0].field, "age");
    }

    #[test]
    fn test_setters_validate_at_assignment() {
        let mut s = NewScientist::create(&fields(json!({"name": "Ada", "field_of_study": "Optics"})))
            .unwrap()
            .with_id(1);
        assert!(s.set_name("").is_err());
        assert!(s.set_field_of_study(String::new()).is_err());
        assert_eq!(s.name(), "Ada");
        s.set_name("Grace").unwrap();
        assert_eq!(s.name(), "Grace");
    }

    #[test]
    fn test_patch_is_all_or_nothing() {
        let mut s = NewScientist::create(&fields(json!({"name": "Ada", "field_of_study": "Optics"})))
            .unwrap()
            .with_id(1);
        assert!(ScientistPatch::from_fields(&fields(json!({"name": "Grace", "field_of_study": ""}))).is_err());

        let patch = ScientistPatch {
            name: Some("Grace".into()),
            field_of_study: Some(String::new()),
        };
        assert!(s.apply(&patch).is_err());
        assert_eq!(s.name(), "Ada");

        let patch = ScientistPatch::from_fields(&fields(json!({"field_of_study": "Geology"}))).unwrap();
        s.apply(&patch).unwrap();
        assert_eq!(s.name(), "Ada");
        assert_eq!(s.field_of_study(), "Geology");
    }

    #[test]
    fn test_patch_rejects_id() {
        let err = ScientistPatch::from_fields(&fields(json!({"id": 9}))).unwrap_err();
        assert_eq!(err.errors[0].field, "id");
    }
}
