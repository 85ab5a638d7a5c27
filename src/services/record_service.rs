use sqlx::PgPool;

use crate::dto::record_dto::NewRecord;
use crate::error::{Error, Result};
use crate::models::record::Record;

const RECORD_COLUMNS: &str = "record_id, user_full_name, position, email, phone, \
     organization_name, external_user_name, external_user_position, external_user_email, \
     external_user_phone, object_name, work_types, access_type, access_start_date, \
     access_end_date, actual_connection_date, actual_disconnection_date, curator, executor, notes";

#[derive(Clone)]
pub struct RecordService {
    pool: PgPool,
}

impl RecordService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whole journal, newest access start first.
    pub async fn list(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records ORDER BY access_start_date DESC, record_id DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, new: NewRecord) -> Result<Record> {
        let record = sqlx::query_as::<_, Record>(&format!(
            r#"
            INSERT INTO records (
                user_full_name, position, email, phone,
                organization_name, external_user_name, external_user_position,
                external_user_email, external_user_phone,
                object_name, work_types, access_type,
                access_start_date, access_end_date,
                actual_connection_date, actual_disconnection_date,
                curator, executor, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(&new.user_full_name)
        .bind(&new.position)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.organization_name)
        .bind(&new.external_user_name)
        .bind(&new.external_user_position)
        .bind(&new.external_user_email)
        .bind(&new.external_user_phone)
        .bind(&new.object_name)
        .bind(&new.work_types)
        .bind(&new.access_type)
        .bind(new.access_start_date)
        .bind(new.access_end_date)
        .bind(new.actual_connection_date)
        .bind(new.actual_disconnection_date)
        .bind(&new.curator)
        .bind(&new.executor)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(record_id = record.record_id, "record created");
        Ok(record)
    }

    /// Full replacement of every editable column.
    pub async fn update(&self, id: i32, new: NewRecord) -> Result<Record> {
        sqlx::query_as::<_, Record>(&format!(
            r#"
            UPDATE records
            SET user_full_name = $2,
                position = $3,
                email = $4,
                phone = $5,
                organization_name = $6,
                external_user_name = $7,
                external_user_position = $8,
                external_user_email = $9,
                external_user_phone = $10,
                object_name = $11,
                work_types = $12,
                access_type = $13,
                access_start_date = $14,
                access_end_date = $15,
                actual_connection_date = $16,
                actual_disconnection_date = $17,
                curator = $18,
                executor = $19,
                notes = $20
            WHERE record_id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(id)
        .bind(&new.user_full_name)
        .bind(&new.position)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.organization_name)
        .bind(&new.external_user_name)
        .bind(&new.external_user_position)
        .bind(&new.external_user_email)
        .bind(&new.external_user_phone)
        .bind(&new.object_name)
        .bind(&new.work_types)
        .bind(&new.access_type)
        .bind(new.access_start_date)
        .bind(new.access_end_date)
        .bind(new.actual_connection_date)
        .bind(new.actual_disconnection_date)
        .bind(&new.curator)
        .bind(&new.executor)
        .bind(&new.notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Запись не найдена".to_string()))
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM records WHERE record_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Запись не найдена".to_string()));
        }
        tracing::info!(record_id = id, "record deleted");
        Ok(())
    }
}
