use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of a name-only catalog table (positions, curators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Positions,
    Curators,
}

impl Catalog {
    pub fn table(&self) -> &'static str {
        match self {
            Catalog::Positions => "positions",
            Catalog::Curators => "curators",
        }
    }

    pub fn name_required_message(&self) -> &'static str {
        match self {
            Catalog::Positions => "Название должности обязательно",
            Catalog::Curators => "Имя куратора обязательно",
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            Catalog::Positions => "Должность не найдена",
            Catalog::Curators => "Куратор не найден",
        }
    }
}
