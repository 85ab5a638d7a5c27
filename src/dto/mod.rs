pub mod auth_dto;
pub mod catalog_dto;
pub mod external_connection_dto;
pub mod page_dto;
pub mod record_dto;
pub mod user_dto;
