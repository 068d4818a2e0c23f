//! Space missions: a REST backend for scientists, planets and the missions that join them.
//!
//! Records are validated field by field before they reach the store, every request runs in one
//! transaction, and responses expand relationships under typed exclusion rules so the
//! scientist → mission → scientist cycle is never followed.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod serialize;
pub mod service;
pub mod state;
pub mod store;

pub use config::{init_tracing, AppConfig};
pub use error::{AppError, ConfigError, FieldError, ValidationError};
pub use model::EntityKind;
pub use routes::{app, common_routes, mission_routes};
pub use serialize::{Graph, Projection, Relation, RuleError};
pub use service::MissionService;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema, MemoryStore, PgStore, Store, StoreBackend};
