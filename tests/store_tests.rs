//! Service and store behaviour against the in-memory backend.

mod common;

use common::*;
use serde_json::json;
use space_missions::{MemoryStore, MissionService};
use std::collections::HashSet;
use std::sync::Arc;

fn service() -> MissionService {
    MissionService::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_delete_cascades_to_exactly_owned_missions() {
    check_cascades(&service()).await;
}

#[tokio::test]
async fn test_failed_writes_persist_nothing() {
    check_failed_writes_persist_nothing(&service()).await;
}

#[tokio::test]
async fn test_mission_keeps_both_keys() {
    check_mission_keys(&service()).await;
}

#[tokio::test]
async fn test_ids_are_positive_and_unique() {
    let service = service();
    let mut seen = HashSet::new();
    for name in ["Ada", "Vera", "Carl", "Jocelyn"] {
        let id = scientist(&service, name).await;
        assert!(id > 0);
        assert!(seen.insert(id));
    }
    let first = *seen.iter().max().unwrap();
    service.delete_scientist(first).await.unwrap();
    let next = scientist(&service, "Edwin").await;
    assert!(!seen.contains(&next));
}

#[tokio::test]
async fn test_scientist_detail_terminates_without_cycles() {
    let service = service();
    let s = scientist(&service, "Ada").await;
    let p = planet(&service, "Mars").await;
    mission(&service, "Mars One", s, p).await;
    mission(&service, "Mars Two", s, p).await;

    let out = service.scientist(s).await.unwrap();
    let missions = out["missions"].as_array().unwrap();
    assert_eq!(missions.len(), 2);
    for m in missions {
        assert!(m.get("scientist").is_none());
        assert_eq!(m["planet"]["name"], "Mars");
        assert!(m["planet"].get("missions").is_none());
    }
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let service = service();
    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_scientist(&fields(json!({"name": format!("s{i}"), "field_of_study": "Optics"})))
                .await
                .unwrap()["id"]
                .as_i64()
                .unwrap()
        }));
    }
    let mut ids = HashSet::new();
    for h in handles {
        ids.insert(h.await.unwrap());
    }
    assert_eq!(ids.len(), 16);
}
