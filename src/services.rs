pub mod auth;
pub mod billing;
pub mod crm_service;
pub mod notification_service;
pub mod operation_service;
pub mod session;
pub mod support_desk;
pub mod support_service;
pub mod team_service;
pub mod tenancy_service;
