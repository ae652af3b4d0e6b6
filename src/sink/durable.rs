//! Relational sink (PostgreSQL).
//!
//! One table per target. Provisioning is idempotent; the insert path binds
//! every value as a parameter. The table identifier is the only interpolated
//! text and it can only come from a validated [`TargetName`].
//!
//! Connections are opened per operation: the loop carries no live database
//! state between iterations, so an outage affects exactly the writes that
//! happen during it.

use super::{RecordSink, SinkError};
use crate::config::DatabaseSection;
use crate::parser::SensorReading;
use crate::target::TargetName;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection, Executor};

/// The relational sink for one target.
#[derive(Debug, Clone)]
pub struct DurableStore {
    options: PgConnectOptions,
    target: TargetName,
}

impl DurableStore {
    pub fn new(db: &DatabaseSection, target: TargetName) -> Self {
        let options = PgConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .database(&db.name)
            .username(&db.user)
            .password(&db.password);
        Self { options, target }
    }

    /// Create the target table if it does not already exist.
    ///
    /// Safe to call at every run start; repeated invocation neither errors
    /// nor redefines the relation.
    pub async fn ensure_schema(&self) -> Result<(), SinkError> {
        let mut conn = self.connect().await?;
        conn.execute(create_table_sql(&self.target).as_str())
            .await?;
        conn.close().await?;
        Ok(())
    }

    async fn connect(&self) -> Result<PgConnection, SinkError> {
        Ok(self.options.connect().await?)
    }
}

/// DDL for one target table. `id` is the synthetic key; `timestamp` is the
/// server-assigned insertion time, distinct from anything the device reports.
fn create_table_sql(target: &TargetName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {target} (
            id SERIAL PRIMARY KEY,
            timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            command VARCHAR(10),
            pressure DECIMAL(10,4),
            temperature DECIMAL(10,4),
            x_value DECIMAL(10,6),
            y_value DECIMAL(10,6),
            air_value DECIMAL(10,4),
            air_status VARCHAR(50),
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )"
    )
}

fn insert_sql(target: &TargetName) -> String {
    format!(
        "INSERT INTO {target} \
         (command, pressure, temperature, x_value, y_value, air_value, air_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)"
    )
}

#[async_trait]
impl RecordSink for DurableStore {
    fn kind(&self) -> &'static str {
        "durable"
    }

    async fn write(&self, reading: &SensorReading) -> Result<(), SinkError> {
        let mut conn = self.connect().await?;
        sqlx::query(&insert_sql(&self.target))
            .bind(&reading.command)
            .bind(reading.pressure)
            .bind(reading.temperature)
            .bind(reading.x)
            .bind(reading.y)
            .bind(reading.air_value)
            .bind(&reading.air_status)
            .execute(&mut conn)
            .await?;
        conn.close().await?;
        Ok(())
    }
}
