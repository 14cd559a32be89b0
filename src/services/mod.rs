pub mod audit_logger;
pub mod permission_service;
pub mod token_service;
pub mod usage_guard;

pub use audit_logger::AuditLogger;
pub use permission_service::PermissionService;
pub use token_service::TokenService;
