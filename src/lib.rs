pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::models::catalog::Catalog;
use crate::services::{
    auth_service::AuthService, catalog_service::CatalogService,
    external_connection_service::ExternalConnectionService,
    organization_service::OrganizationService, record_service::RecordService,
    user_service::UserService,
};
use crate::utils::token::TokenSigner;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub organization_service: OrganizationService,
    pub position_service: CatalogService,
    pub curator_service: CatalogService,
    pub external_connection_service: ExternalConnectionService,
    pub record_service: RecordService,
    pub enforce_password_change: bool,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let signer = TokenSigner::new(&config.jwt_secret, config.jwt_ttl_minutes);

        let auth_service = AuthService::new(pool.clone(), signer);
        let user_service = UserService::new(pool.clone());
        let organization_service = OrganizationService::new(pool.clone());
        let position_service = CatalogService::new(pool.clone(), Catalog::Positions);
        let curator_service = CatalogService::new(pool.clone(), Catalog::Curators);
        let external_connection_service = ExternalConnectionService::new(pool.clone());
        let record_service = RecordService::new(pool.clone());

        Self {
            pool,
            auth_service,
            user_service,
            organization_service,
            position_service,
            curator_service,
            external_connection_service,
            record_service,
            enforce_password_change: config.enforce_password_change,
        }
    }
}
