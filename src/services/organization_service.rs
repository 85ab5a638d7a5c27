use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::organization::Organization;
use crate::utils::validation::non_blank;

#[derive(Clone)]
pub struct OrganizationService {
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_by, created_at FROM organizations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, name: Option<String>, created_by: i32) -> Result<Organization> {
        let name = non_blank(name)
            .ok_or_else(|| Error::BadRequest("Требуется название организации".to_string()))?;

        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, created_by)
            VALUES ($1, $2)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(&name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(organization_id = org.id, created_by, "organization created");
        Ok(org)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Организация не найдена".to_string()));
        }
        Ok(())
    }
}
