pub mod catalog;
pub mod external_connection;
pub mod organization;
pub mod record;
pub mod user;
