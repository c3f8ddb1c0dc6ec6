use crate::config::DatabaseConfig;
use crate::error::ProbeError;
use crate::events::ReplaySample;
use chrono::NaiveDateTime;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use log::info;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::future::Future;
use std::pin::Pin;

/// Trait for reading recently processed round interactions
pub trait ReplayProbe: Send + Sync {
    /// Run the sampling query once
    ///
    /// The stream is lazy and finite; it cannot be restarted; call again to
    /// re-query.
    fn recent_samples(&self) -> BoxStream<'_, Result<ReplaySample, ProbeError>>;
}

/// Opens a [`ReplayProbe`] once the database password is known
pub trait ReplaySource: Send + Sync {
    fn open<'a>(
        &'a self,
        password: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ReplayProbe>, ProbeError>> + Send + 'a>>;
}

/// Sampling query over the trailing `inserted_at` window
///
/// Both timestamps are read as wall-clock values so their difference never
/// depends on the session time zone.
pub fn replay_query(window_minutes: u32) -> String {
    format!(
        "SELECT created_at::timestamp AS created_at, \
                inserted_at::timestamp AS inserted_at, \
                round_id::bigint AS round_id \
         FROM round_interactions \
         WHERE inserted_at >= now() - INTERVAL '{} minutes'",
        window_minutes
    )
}

/// Connection settings for the sampling session
///
/// The session is pinned to UTC so `timestamptz` columns convert to wall
/// clock without daylight-saving shifts.
pub fn connect_options(database: &DatabaseConfig, password: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .database(&database.name)
        .username(&database.username)
        .password(password)
        .ssl_mode(PgSslMode::Disable)
        .options([("timezone", "UTC")])
}

#[derive(Debug, sqlx::FromRow)]
struct RoundInteractionRow {
    created_at: NaiveDateTime,
    inserted_at: NaiveDateTime,
    round_id: i64,
}

impl From<RoundInteractionRow> for ReplaySample {
    fn from(row: RoundInteractionRow) -> Self {
        ReplaySample {
            round_id: row.round_id,
            created_at: row.created_at.and_utc(),
            inserted_at: row.inserted_at.and_utc(),
        }
    }
}

/// Replay probe backed by PostgreSQL
pub struct PostgresReplayProbe {
    pool: PgPool,
    query: String,
}

impl PostgresReplayProbe {
    /// Connect with a single-connection pool
    pub async fn connect(
        database: &DatabaseConfig,
        password: &str,
        window_minutes: u32,
    ) -> Result<Self, ProbeError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options(database, password))
            .await
            .map_err(|e| ProbeError::Database(format!("connect failed: {}", e)))?;

        info!(
            "Connected to database {} on {}:{}",
            database.name, database.host, database.port
        );

        Ok(Self {
            pool,
            query: replay_query(window_minutes),
        })
    }
}

impl ReplayProbe for PostgresReplayProbe {
    fn recent_samples(&self) -> BoxStream<'_, Result<ReplaySample, ProbeError>> {
        sqlx::query_as::<_, RoundInteractionRow>(&self.query)
            .fetch(&self.pool)
            .map_ok(ReplaySample::from)
            .map_err(|e| ProbeError::Database(e.to_string()))
            .boxed()
    }
}

/// [`ReplaySource`] that connects to PostgreSQL with the configured settings
pub struct PostgresReplaySource {
    database: DatabaseConfig,
    window_minutes: u32,
}

impl PostgresReplaySource {
    pub fn new(database: DatabaseConfig, window_minutes: u32) -> Self {
        Self {
            database,
            window_minutes,
        }
    }
}

impl ReplaySource for PostgresReplaySource {
    fn open<'a>(
        &'a self,
        password: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ReplayProbe>, ProbeError>> + Send + 'a>> {
        Box::pin(async move {
            let probe =
                PostgresReplayProbe::connect(&self.database, password, self.window_minutes)
                    .await?;
            Ok(Box::new(probe) as Box<dyn ReplayProbe>)
        })
    }
}
