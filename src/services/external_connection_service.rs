use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::external_connection_dto::{
    page_offset, total_pages, ExternalConnectionPage, NewExternalConnection,
};
use crate::error::{Error, Result};
use crate::models::external_connection::ExternalConnection;

const CONNECTION_COLUMNS: &str =
    "id, organization, full_name, position, email, phone, access_start, access_end";

#[derive(Clone)]
pub struct ExternalConnectionService {
    pool: PgPool,
}

impl ExternalConnectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes every connection whose access window closed before `now`.
    pub async fn sweep_expired(&self, now: NaiveDateTime) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM external_connections WHERE access_end IS NOT NULL AND access_end < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            tracing::info!(removed, "expired external connections removed");
        }
        Ok(removed)
    }

    /// Sweeps first, then returns one page ordered by newest access start.
    pub async fn list(&self, page: i64, limit: i64, now: NaiveDateTime) -> Result<ExternalConnectionPage> {
        self.sweep_expired(now).await?;

        let offset = page_offset(page, limit);
        let mut data = sqlx::query_as::<_, ExternalConnection>(&format!(
            "SELECT {} FROM external_connections ORDER BY access_start DESC, id DESC LIMIT $1 OFFSET $2",
            CONNECTION_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        // A row can expire between the sweep and the read.
        data.retain(|c| !c.is_expired(now));

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM external_connections")
            .fetch_one(&self.pool)
            .await?;
        Ok(ExternalConnectionPage {
            data,
            total_items: total.0,
            total_pages: total_pages(total.0, limit),
        })
    }

    pub async fn add(&self, new: NewExternalConnection) -> Result<ExternalConnection> {
        let mut tx = self.pool.begin().await?;
        let organization = organization_name(&mut tx, new.organization_id).await?;

        let created = sqlx::query_as::<_, ExternalConnection>(&format!(
            r#"
            INSERT INTO external_connections (organization, full_name, position, email, phone, access_start, access_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        ))
        .bind(organization)
        .bind(&new.full_name)
        .bind(&new.position)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.access_start)
        .bind(new.access_end)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(connection_id = created.id, "external connection added");
        Ok(created)
    }

    pub async fn update(&self, id: i32, new: NewExternalConnection) -> Result<ExternalConnection> {
        let mut tx = self.pool.begin().await?;
        let organization = organization_name(&mut tx, new.organization_id).await?;

        let updated = sqlx::query_as::<_, ExternalConnection>(&format!(
            r#"
            UPDATE external_connections
            SET organization = $2,
                full_name = $3,
                position = $4,
                email = $5,
                phone = $6,
                access_start = $7,
                access_end = $8
            WHERE id = $1
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        ))
        .bind(id)
        .bind(organization)
        .bind(&new.full_name)
        .bind(&new.position)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.access_start)
        .bind(new.access_end)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Подключение не найдено".to_string()))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM external_connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Подключение не найдено".to_string()));
        }
        Ok(())
    }
}

async fn organization_name(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<String> {
    let row: Option<(String,)> = sqlx::query_as("SELECT name FROM organizations WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    row.map(|(name,)| name)
        .ok_or_else(|| Error::BadRequest("Организация не найдена".to_string()))
}
