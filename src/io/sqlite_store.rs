//! SQLite-backed journey store
//!
//! One connection behind a mutex; every async query runs on the blocking
//! pool so the runtime threads never wait on SQLite.

use crate::domain::journey::{Journey, Pass, Section};
use crate::domain::types::{JourneyId, UserId};
use crate::io::store::{JourneyStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Journey rows joined with their sections and passes, in travel order
const JOURNEY_TREE_SELECT: &str = "SELECT j.id, j.user_id, j.duration, j.created_at,
        s.id, p.station_name, p.station_coordinate_x, p.station_coordinate_y
     FROM journeys j
     LEFT JOIN sections s ON s.journey_id = j.id
     LEFT JOIN passes p ON p.section_id = s.id";

const JOURNEY_TREE_ORDER: &str = "ORDER BY j.created_at, j.id, s.position, s.id, p.position, p.id";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Unavailable(format!("create {}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "sqlite_store_opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Insert a journey with its sections and passes in one transaction
    pub fn insert_journey(&self, journey: &Journey) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO journeys (id, user_id, duration, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                journey.id.as_str(),
                journey.user_id.as_str(),
                journey.duration,
                journey.created_at.timestamp_millis()
            ],
        )?;

        for (section_pos, section) in journey.sections.iter().enumerate() {
            tx.execute(
                "INSERT INTO sections (journey_id, position) VALUES (?1, ?2)",
                params![journey.id.as_str(), section_pos as i64],
            )?;
            let section_id = tx.last_insert_rowid();

            for (pass_pos, pass) in section.passes.iter().enumerate() {
                tx.execute(
                    "INSERT INTO passes (section_id, position, station_name, station_coordinate_x, station_coordinate_y)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        section_id,
                        pass_pos as i64,
                        pass.station_name,
                        pass.station_coordinate_x,
                        pass.station_coordinate_y
                    ],
                )?;
            }
        }

        tx.commit()?;
        debug!(
            jid = %journey.id,
            user_id = %journey.user_id,
            sections = %journey.sections.len(),
            passes = %journey.pass_count(),
            "journey_inserted"
        );
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store worker failed: {e}")))?
    }
}

/// Lower bound as stored (epoch ms); no bound selects everything
fn bound_ms(created_after: Option<DateTime<Utc>>) -> i64 {
    created_after.map_or(i64::MIN, |t| t.timestamp_millis())
}

struct TreeRow {
    journey_id: String,
    user_id: String,
    duration: i64,
    created_at_ms: i64,
    section_id: Option<i64>,
    station_name: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
}

fn load_journey_tree(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Journey>, StoreError> {
    let sql = format!("{JOURNEY_TREE_SELECT} WHERE {filter} {JOURNEY_TREE_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(TreeRow {
                journey_id: row.get(0)?,
                user_id: row.get(1)?,
                duration: row.get(2)?,
                created_at_ms: row.get(3)?,
                section_id: row.get(4)?,
                station_name: row.get(5)?,
                x: row.get(6)?,
                y: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    fold_journey_tree(rows)
}

/// Rebuild nested journeys from flat join rows ordered by journey, section, pass
fn fold_journey_tree(rows: Vec<TreeRow>) -> Result<Vec<Journey>, StoreError> {
    let mut journeys: Vec<Journey> = Vec::new();
    let mut current_section: Option<i64> = None;

    for row in rows {
        if journeys.last().map(|j| j.id.as_str()) != Some(row.journey_id.as_str()) {
            let created_at = DateTime::<Utc>::from_timestamp_millis(row.created_at_ms).ok_or_else(|| {
                StoreError::Corrupt(format!("journey {} created_at {}", row.journey_id, row.created_at_ms))
            })?;
            journeys.push(Journey {
                id: JourneyId(row.journey_id),
                user_id: UserId(row.user_id),
                duration: row.duration,
                created_at,
                sections: Vec::new(),
            });
            current_section = None;
        }
        let Some(journey) = journeys.last_mut() else {
            continue;
        };

        let Some(section_id) = row.section_id else {
            continue;
        };
        if current_section != Some(section_id) {
            journey.sections.push(Section::default());
            current_section = Some(section_id);
        }

        if let (Some(name), Some(x), Some(y)) = (row.station_name, row.x, row.y) {
            if let Some(section) = journey.sections.last_mut() {
                section.passes.push(Pass::new(&name, x, y));
            }
        }
    }

    Ok(journeys)
}

#[async_trait]
impl JourneyStore for SqliteStore {
    async fn find_journey(&self, id: &JourneyId, owner: &UserId) -> Result<Option<Journey>, StoreError> {
        let (id, owner) = (id.0.clone(), owner.0.clone());
        self.run(move |conn| {
            let journeys = load_journey_tree(conn, "j.id = ?1 AND j.user_id = ?2", params![id, owner])?;
            Ok(journeys.into_iter().next())
        })
        .await
    }

    async fn find_journeys(
        &self,
        owner: &UserId,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Journey>, StoreError> {
        let owner = owner.0.clone();
        let bound = bound_ms(created_after);
        self.run(move |conn| load_journey_tree(conn, "j.user_id = ?1 AND j.created_at >= ?2", params![owner, bound]))
            .await
    }

    async fn count_journeys(&self, owner: &UserId) -> Result<u64, StoreError> {
        let owner = owner.0.clone();
        self.run(move |conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM journeys WHERE user_id = ?1", params![owner], |row| row.get(0))?;
            u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("journey count {count}")))
        })
        .await
    }

    async fn sum_duration(&self, owner: &UserId) -> Result<Option<i64>, StoreError> {
        let owner = owner.0.clone();
        self.run(move |conn| {
            let sum: Option<i64> =
                conn.query_row("SELECT SUM(duration) FROM journeys WHERE user_id = ?1", params![owner], |row| {
                    row.get(0)
                })?;
            Ok(sum)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_journey() -> Journey {
        Journey::new("alice", 90)
            .with_id("j-1")
            .with_created_at(Utc.with_ymd_and_hms(2026, 10, 1, 7, 30, 0).unwrap())
            .with_section(Section::new(vec![Pass::new("A", 0.0, 0.0), Pass::new("B", 3.0, 4.0)]))
            .with_section(Section::default())
            .with_section(Section::new(vec![Pass::new("B", 3.0, 4.0), Pass::new("C", 3.0, 7.0)]))
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_empty_sections() {
        let store = SqliteStore::open_in_memory().unwrap();
        let journey = sample_journey();
        store.insert_journey(&journey).unwrap();

        let loaded = store.find_journey(&journey.id, &journey.user_id).await.unwrap().unwrap();
        assert_eq!(loaded, journey);
    }

    #[tokio::test]
    async fn test_find_journey_rejects_other_owner() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_journey(&sample_journey()).unwrap();

        let found = store.find_journey(&JourneyId::from("j-1"), &UserId::from("mallory")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_window_bounds_list_but_not_aggregates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let alice = UserId::from("alice");
        for (id, day, duration) in [("a", 1, 30), ("b", 10, 45), ("c", 12, 60)] {
            let journey = Journey::new("alice", duration)
                .with_id(id)
                .with_created_at(Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap());
            store.insert_journey(&journey).unwrap();
        }
        let bound = Utc.with_ymd_and_hms(2026, 10, 10, 9, 0, 0).unwrap();

        assert_eq!(store.count_journeys(&alice).await.unwrap(), 3);
        assert_eq!(store.sum_duration(&alice).await.unwrap(), Some(135));

        let ids: Vec<String> =
            store.find_journeys(&alice, Some(bound)).await.unwrap().into_iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_sum_duration_null_for_unknown_owner() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.sum_duration(&UserId::from("nobody")).await.unwrap(), None);
        assert_eq!(store.count_journeys(&UserId::from("nobody")).await.unwrap(), 0);
    }

    #[test]
    fn test_duplicate_journey_id_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_journey(&sample_journey()).unwrap();
        let err = store.insert_journey(&sample_journey()).unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("journeys.db");

        let store = SqliteStore::open(&db_path);
        assert!(store.is_ok(), "store creation failed: {:?}", store.err());
        assert!(db_path.exists());
    }
}
