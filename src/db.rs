use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres};
use tokio::sync::Mutex;

use crate::entities::{RideId, RideRecord};
use crate::error::{config_error, Error};

pub const DEFAULT_RIDES_TABLE: &str = "rides";

/// Durable persistence for ride records, keyed by ride id.
#[async_trait]
pub trait RideStore {
    async fn put(&self, record: &RideRecord) -> Result<(), Error>;
}

pub struct PgRideStore {
    pool: Pool<Postgres>,
    table: String,
}

impl PgRideStore {
    #[tracing::instrument(name = "PgRideStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32, table: &str) -> Result<Self, Error> {
        if !is_identifier(table) {
            return Err(config_error(format!("invalid rides table name: {}", table)));
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        // ride service (KV store)
        pool.execute(
            format!(
                "CREATE TABLE IF NOT EXISTS {} (ride_id VARCHAR PRIMARY KEY, data JSONB NOT NULL)",
                table
            )
            .as_str(),
        )
        .await?;

        Ok(Self {
            pool,
            table: table.into(),
        })
    }
}

#[async_trait]
impl RideStore for PgRideStore {
    #[tracing::instrument(skip(self, record), fields(ride_id = %record.ride_id))]
    async fn put(&self, record: &RideRecord) -> Result<(), Error> {
        let query = format!("INSERT INTO {} (ride_id, data) VALUES ($1, $2)", self.table);

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(&query)
                .bind(record.ride_id.as_str())
                .bind(Json(record)),
        )
        .await?;

        Ok(())
    }
}

/// In-process store for local runs and tests.
#[derive(Default)]
pub struct MemoryRideStore {
    rides: Mutex<HashMap<RideId, RideRecord>>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, ride_id: &RideId) -> Option<RideRecord> {
        self.rides.lock().await.get(ride_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rides.lock().await.len()
    }
}

#[async_trait]
impl RideStore for MemoryRideStore {
    #[tracing::instrument(skip(self, record), fields(ride_id = %record.ride_id))]
    async fn put(&self, record: &RideRecord) -> Result<(), Error> {
        let mut rides = self.rides.lock().await;

        if rides.contains_key(&record.ride_id) {
            return Err(crate::error::storage_error(format!(
                "ride {} already exists",
                record.ride_id
            )));
        }

        rides.insert(record.ride_id.clone(), record.clone());

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[test]
fn memory_store_puts_and_gets() {
    use crate::auth::User;
    use crate::entities::{Driver, RIDE_ID_BYTES};
    use tokio_test::block_on;

    let store = MemoryRideStore::new();
    let user = User::new("alice").unwrap();
    let record = RideRecord::new(
        RideId::from_bytes([1; RIDE_ID_BYTES]),
        &user,
        Driver::new("Bucephalus", "Golden", "Male"),
    );

    block_on(store.put(&record)).unwrap();

    assert_eq!(block_on(store.len()), 1);
    assert_eq!(block_on(store.get(&record.ride_id)), Some(record));
}

#[test]
fn memory_store_rejects_duplicate_ride_id() {
    use crate::auth::User;
    use crate::entities::{Driver, RIDE_ID_BYTES};
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let store = MemoryRideStore::new();
    let user = User::new("alice").unwrap();
    let record = RideRecord::new(
        RideId::from_bytes([2; RIDE_ID_BYTES]),
        &user,
        Driver::new("Bucephalus", "Golden", "Male"),
    );

    block_on(store.put(&record)).unwrap();
    let err = block_on(store.put(&record)).unwrap_err();

    assert_eq!(err.kind, ErrorKind::StorageFailure);
    assert_eq!(block_on(store.len()), 1);
}

#[test]
fn table_names_must_be_identifiers() {
    assert!(is_identifier("rides"));
    assert!(is_identifier("_rides_2"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("2rides"));
    assert!(!is_identifier("rides; DROP TABLE rides"));
}
