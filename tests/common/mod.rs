//! Store-agnostic checks shared by the memory and Postgres test suites.

#![allow(dead_code)]

use serde_json::{json, Value};
use space_missions::model::body_to_map;
use space_missions::{AppError, EntityKind, MissionService};

pub fn fields(v: Value) -> space_missions::model::FieldMap {
    body_to_map(v).unwrap()
}

pub async fn scientist(service: &MissionService, name: &str) -> i64 {
    let out = service
        .create_scientist(&fields(json!({"name": name, "field_of_study": "Astrophysics"})))
        .await
        .unwrap();
    out["id"].as_i64().unwrap()
}

pub async fn planet(service: &MissionService, name: &str) -> i64 {
    let out = service
        .create_planet(&fields(json!({"name": name, "distance_from_earth": 225, "nearest_star": "Sun"})))
        .await
        .unwrap();
    out["id"].as_i64().unwrap()
}

pub async fn mission(service: &MissionService, name: &str, scientist_id: i64, planet_id: i64) -> i64 {
    let out = service
        .create_mission(&fields(
            json!({"name": name, "scientist_id": scientist_id, "planet_id": planet_id}),
        ))
        .await
        .unwrap();
    out["id"].as_i64().unwrap()
}

pub async fn count(service: &MissionService, kind: EntityKind) -> u64 {
    service.store().count(kind).await.unwrap()
}

/// Deleting a scientist removes exactly its missions; deleting a planet does the same for the planet.
pub async fn check_cascades(service: &MissionService) {
    let ada = scientist(service, "Ada").await;
    let vera = scientist(service, "Vera").await;
    let mars = planet(service, "Mars").await;
    let venus = planet(service, "Venus").await;

    let ada_missions = vec![
        mission(service, "Mars One", ada, mars).await,
        mission(service, "Venus One", ada, venus).await,
        mission(service, "Mars Two", ada, mars).await,
    ];
    let vera_mars = mission(service, "Mars Three", vera, mars).await;
    let vera_venus = mission(service, "Venus Two", vera, venus).await;
    let before = count(service, EntityKind::Mission).await;

    assert_eq!(service.delete_scientist(ada).await.unwrap(), 3);
    assert_eq!(count(service, EntityKind::Mission).await, before - 3);
    for id in ada_missions {
        assert!(matches!(
            service.mission(id).await,
            Err(AppError::NotFound(EntityKind::Mission))
        ));
    }
    assert_eq!(service.mission(vera_mars).await.unwrap()["scientist_id"], json!(vera));

    assert_eq!(service.delete_planet(venus).await.unwrap(), 1);
    assert!(service.mission(vera_venus).await.is_err());
    assert!(service.mission(vera_mars).await.is_ok());
    assert!(matches!(
        service.delete_scientist(ada).await,
        Err(AppError::NotFound(EntityKind::Scientist))
    ));
}

/// Failed creates leave every table as it was.
pub async fn check_failed_writes_persist_nothing(service: &MissionService) {
    let ada = scientist(service, "Ada").await;
    let mars = planet(service, "Mars").await;
    let scientists = count(service, EntityKind::Scientist).await;
    let missions = count(service, EntityKind::Mission).await;

    for body in [
        json!({"name": "", "field_of_study": "Optics"}),
        json!({"name": "Grace"}),
        json!({"name": "Grace", "field_of_study": null}),
    ] {
        let err = service.create_scientist(&fields(body)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert_eq!(count(service, EntityKind::Scientist).await, scientists);

    let err = service
        .create_mission(&fields(json!({"name": "Ghost", "scientist_id": ada + 1000, "planet_id": mars})))
        .await
        .unwrap_err();
    match err {
        AppError::Validation(v) => assert_eq!(v.errors[0].field, "scientist_id"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(count(service, EntityKind::Mission).await, missions);

    let err = service
        .update_scientist(ada, Ok(fields(json!({"name": "Grace", "field_of_study": ""}))))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(service.scientist(ada).await.unwrap()["name"], "Ada");
}

/// A mission created against S and P keeps both keys.
pub async fn check_mission_keys(service: &MissionService) {
    let s = scientist(service, "Ada").await;
    let p = planet(service, "Mars").await;
    let id = mission(service, "Mars One", s, p).await;
    let out = service.mission(id).await.unwrap();
    assert_eq!(out["scientist_id"], json!(s));
    assert_eq!(out["planet_id"], json!(p));
    assert_eq!(out["scientist"]["id"], json!(s));
    assert!(out["scientist"].get("missions").is_none());
    assert!(out["planet"].get("missions").is_none());
}
