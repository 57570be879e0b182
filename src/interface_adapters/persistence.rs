use async_trait::async_trait;
use sqlx::PgPool;
use tracing::trace;

use crate::domain::pdu::{EntityStatePdu, FirePdu};
use crate::domain::ports::PduSink;
use crate::domain::{Pdu, PduBody, SinkError};

// PostgreSQL sink: EntityState and Fire PDUs become rows; other kinds are skipped.
#[derive(Clone)]
pub struct PgPduSink {
    pub db: PgPool,
}

impl PgPduSink {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert_entity_state(
        &self,
        es: &EntityStatePdu,
        timestamp: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO entity_state_record
                (site, application, entity, locationx, locationy, locationz, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(i32::from(es.entity_id.site))
        .bind(i32::from(es.entity_id.application))
        .bind(i32::from(es.entity_id.entity))
        .bind(es.location.x)
        .bind(es.location.y)
        .bind(es.location.z)
        .bind(timestamp)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn insert_fire(&self, fire: &FirePdu, timestamp: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO fire_event_record
                (firing_site, firing_application, firing_entity,
                 target_site, target_application, target_entity,
                 munition_site, munition_application, munition_entity,
                 timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(i32::from(fire.firing_id.site))
        .bind(i32::from(fire.firing_id.application))
        .bind(i32::from(fire.firing_id.entity))
        .bind(i32::from(fire.target_id.site))
        .bind(i32::from(fire.target_id.application))
        .bind(i32::from(fire.target_id.entity))
        .bind(i32::from(fire.munition_id.site))
        .bind(i32::from(fire.munition_id.application))
        .bind(i32::from(fire.munition_id.entity))
        .bind(timestamp)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PduSink for PgPduSink {
    async fn record(&self, pdu: &Pdu) -> Result<(), SinkError> {
        // Raw header word, marker bit included.
        let timestamp = i64::from(pdu.header.timestamp);
        let result = match &pdu.body {
            PduBody::EntityState(es) => self.insert_entity_state(es, timestamp).await,
            PduBody::Fire(fire) => self.insert_fire(fire, timestamp).await,
            _ => {
                trace!(pdu = pdu.kind().name(), "kind not persisted");
                return Ok(());
            }
        };
        result.map_err(|e| SinkError::Storage(e.to_string()))
    }
}
