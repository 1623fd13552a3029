pub mod store;
pub use store::{PgStore, RecordStore};

pub mod crm_repo;
pub mod notification_repo;
pub mod operations_repo;
pub mod support_repo;
pub mod tenancy_repo;
pub mod user_repo;

#[cfg(test)]
pub mod memory;
