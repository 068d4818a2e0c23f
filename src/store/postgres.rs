//! PostgreSQL store: one sqlx transaction per call, cascades issued explicitly before the parent row
//! is removed.

use super::{mission_graph_of, missing_parent, Store};
use crate::error::{AppError, ConfigError};
use crate::model::{EntityKind, Mission, NewMission, NewPlanet, NewScientist, Planet, Scientist, ScientistPatch};
use crate::serialize::Graph;
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgConnection, PgPool};
use std::str::FromStr;

const SCIENTIST_COLUMNS: &str = "id, name, field_of_study";
const PLANET_COLUMNS: &str = "id, name, distance_from_earth, nearest_star";
const MISSION_COLUMNS: &str = "id, name, scientist_id, planet_id";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS scientists (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (name <> ''),
        field_of_study TEXT NOT NULL CHECK (field_of_study <> '')
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS planets (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (name <> ''),
        distance_from_earth BIGINT NOT NULL,
        nearest_star TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS missions (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (name <> ''),
        scientist_id BIGINT NOT NULL REFERENCES scientists (id),
        planet_id BIGINT NOT NULL REFERENCES planets (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_missions_scientist_id ON missions (scientist_id)",
    "CREATE INDEX IF NOT EXISTS ix_missions_planet_id ON missions (planet_id)",
];

/// Create `scientists`, `planets` and `missions` if they do not exist. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|_| invalid_url(database_url))?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| invalid_url(url))? + 1;
    if url[..path_start].ends_with("//") {
        return Err(invalid_url(url));
    }
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn invalid_url(url: &str) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        value: url.to_string(),
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Row lock taken by a by-id read inside a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowLock {
    Plain,
    /// Parent of a row being inserted; blocks a concurrent delete until commit.
    Share,
    Update,
}

fn select_by_id(columns: &str, table: &str, lock: RowLock) -> String {
    let suffix = match lock {
        RowLock::Plain => "",
        RowLock::Share => " FOR SHARE",
        RowLock::Update => " FOR UPDATE",
    };
    format!("SELECT {} FROM {} WHERE id = $1{}", columns, table, suffix)
}

async fn fetch_scientist(conn: &mut PgConnection, id: i64, lock: RowLock) -> Result<Option<Scientist>, AppError> {
    let sql = select_by_id(SCIENTIST_COLUMNS, "scientists", lock);
    tracing::debug!(sql = %sql, id, "query");
    Ok(sqlx::query_as::<_, Scientist>(&sql).bind(id).fetch_optional(conn).await?)
}

async fn fetch_planet(conn: &mut PgConnection, id: i64, lock: RowLock) -> Result<Option<Planet>, AppError> {
    let sql = select_by_id(PLANET_COLUMNS, "planets", lock);
    tracing::debug!(sql = %sql, id, "query");
    Ok(sqlx::query_as::<_, Planet>(&sql).bind(id).fetch_optional(conn).await?)
}

/// Removes every mission whose `column` equals `id`. `column` is one of our own constants.
async fn delete_missions_by(conn: &mut PgConnection, column: &str, id: i64) -> Result<u64, AppError> {
    let sql = format!("DELETE FROM missions WHERE {} = $1", column);
    tracing::debug!(sql = %sql, id, "query (tx)");
    let result = sqlx::query(&sql).bind(id).execute(conn).await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl Store for PgStore {
    async fn scientists(&self) -> Result<Vec<Scientist>, AppError> {
        let sql = format!("SELECT {} FROM scientists ORDER BY id", SCIENTIST_COLUMNS);
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Scientist>(&sql).fetch_all(&self.pool).await?)
    }

    async fn scientist(&self, id: i64) -> Result<Option<Scientist>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_scientist(&mut conn, id, RowLock::Plain).await
    }

    async fn scientist_graph(&self, id: i64) -> Result<Option<Graph>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(scientist) = fetch_scientist(&mut tx, id, RowLock::Plain).await? else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM missions WHERE scientist_id = $1 ORDER BY id",
            MISSION_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let missions = sqlx::query_as::<_, Mission>(&sql).bind(id).fetch_all(&mut *tx).await?;

        let planet_ids: Vec<i64> = missions.iter().map(Mission::planet_id).collect();
        let sql = format!("SELECT {} FROM planets WHERE id = ANY($1) ORDER BY id", PLANET_COLUMNS);
        tracing::debug!(sql = %sql, params = ?planet_ids, "query (tx)");
        let planets = sqlx::query_as::<_, Planet>(&sql)
            .bind(&planet_ids)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let mut graph = Graph::new();
        graph.add_scientist(scientist);
        missions.into_iter().for_each(|m| graph.add_mission(m));
        planets.into_iter().for_each(|p| graph.add_planet(p));
        Ok(Some(graph))
    }

    async fn insert_scientist(&self, new: NewScientist) -> Result<Scientist, AppError> {
        let sql = format!(
            "INSERT INTO scientists (name, field_of_study) VALUES ($1, $2) RETURNING {}",
            SCIENTIST_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Scientist>(&sql)
            .bind(new.name())
            .bind(new.field_of_study())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_scientist(&self, id: i64, patch: &ScientistPatch) -> Result<Option<Scientist>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut scientist) = fetch_scientist(&mut tx, id, RowLock::Update).await? else {
            return Ok(None);
        };
        scientist.apply(patch)?;
        let sql = format!(
            "UPDATE scientists SET name = $1, field_of_study = $2 WHERE id = $3 RETURNING {}",
            SCIENTIST_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let updated = sqlx::query_as::<_, Scientist>(&sql)
            .bind(scientist.name())
            .bind(scientist.field_of_study())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_scientist(&self, id: i64) -> Result<Option<u64>, AppError> {
        let mut tx = self.pool.begin().await?;
        if fetch_scientist(&mut tx, id, RowLock::Update).await?.is_none() {
            return Ok(None);
        }
        let removed = delete_missions_by(&mut tx, "scientist_id", id).await?;
        sqlx::query("DELETE FROM scientists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(scientist_id = id, missions = removed, "deleted scientist");
        Ok(Some(removed))
    }

    async fn planets(&self) -> Result<Vec<Planet>, AppError> {
        let sql = format!("SELECT {} FROM planets ORDER BY id", PLANET_COLUMNS);
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Planet>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert_planet(&self, new: NewPlanet) -> Result<Planet, AppError> {
        let sql = format!(
            "INSERT INTO planets (name, distance_from_earth, nearest_star) VALUES ($1, $2, $3) RETURNING {}",
            PLANET_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Planet>(&sql)
            .bind(&new.name)
            .bind(new.distance_from_earth)
            .bind(&new.nearest_star)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_planet(&self, id: i64) -> Result<Option<u64>, AppError> {
        let mut tx = self.pool.begin().await?;
        if fetch_planet(&mut tx, id, RowLock::Update).await?.is_none() {
            return Ok(None);
        }
        let removed = delete_missions_by(&mut tx, "planet_id", id).await?;
        sqlx::query("DELETE FROM planets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(planet_id = id, missions = removed, "deleted planet");
        Ok(Some(removed))
    }

    async fn insert_mission(&self, new: NewMission) -> Result<Graph, AppError> {
        let mut tx = self.pool.begin().await?;
        let scientist = fetch_scientist(&mut tx, new.scientist_id(), RowLock::Share)
            .await?
            .ok_or_else(|| missing_parent("scientist_id", EntityKind::Scientist, new.scientist_id()))?;
        let planet = fetch_planet(&mut tx, new.planet_id(), RowLock::Share)
            .await?
            .ok_or_else(|| missing_parent("planet_id", EntityKind::Planet, new.planet_id()))?;
        let sql = format!(
            "INSERT INTO missions (name, scientist_id, planet_id) VALUES ($1, $2, $3) RETURNING {}",
            MISSION_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        let mission = sqlx::query_as::<_, Mission>(&sql)
            .bind(&new.name)
            .bind(new.scientist_id)
            .bind(new.planet_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(mission_graph_of(mission, scientist, planet))
    }

    async fn mission_graph(&self, id: i64) -> Result<Option<Graph>, AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {} FROM missions WHERE id = $1", MISSION_COLUMNS);
        tracing::debug!(sql = %sql, id, "query (tx)");
        let Some(mission) = sqlx::query_as::<_, Mission>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let scientist = fetch_scientist(&mut tx, mission.scientist_id(), RowLock::Plain).await?;
        let planet = fetch_planet(&mut tx, mission.planet_id(), RowLock::Plain).await?;
        tx.commit().await?;
        Ok(match (scientist, planet) {
            (Some(s), Some(p)) => Some(mission_graph_of(mission, s, p)),
            _ => None,
        })
    }

    async fn count(&self, kind: EntityKind) -> Result<u64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let (n,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(n as u64)
    }
}
