use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::catalog::{Catalog, CatalogEntry};
use crate::utils::validation::non_blank;

/// CRUD over one name-only catalog table. Positions and curators share the
/// implementation and differ only in table name and messages.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    catalog: Catalog,
}

impl CatalogService {
    pub fn new(pool: PgPool, catalog: Catalog) -> Self {
        Self { pool, catalog }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    fn name(&self, raw: Option<String>) -> Result<String> {
        non_blank(raw).ok_or_else(|| Error::BadRequest(self.catalog.name_required_message().to_string()))
    }

    pub async fn list(&self) -> Result<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT id, name FROM {} ORDER BY name",
            self.catalog.table()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, name: Option<String>) -> Result<CatalogEntry> {
        let name = self.name(name)?;
        let entry = sqlx::query_as::<_, CatalogEntry>(&format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
            self.catalog.table()
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(table = self.catalog.table(), id = entry.id, "catalog entry created");
        Ok(entry)
    }

    pub async fn update(&self, id: i32, name: Option<String>) -> Result<CatalogEntry> {
        let name = self.name(name)?;
        sqlx::query_as::<_, CatalogEntry>(&format!(
            "UPDATE {} SET name = $2 WHERE id = $1 RETURNING id, name",
            self.catalog.table()
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(self.catalog.not_found_message().to_string()))
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.catalog.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(self.catalog.not_found_message().to_string()));
        }
        Ok(())
    }
}
