pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod notifications;
pub mod operations;
pub mod support;
pub mod team;
pub mod tenancy;
