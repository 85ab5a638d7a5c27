pub mod auth_service;
pub mod catalog_service;
pub mod export_service;
pub mod external_connection_service;
pub mod organization_service;
pub mod password_policy;
pub mod record_service;
pub mod record_view;
pub mod user_service;
