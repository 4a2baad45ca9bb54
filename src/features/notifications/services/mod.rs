mod audit_service;
mod notification_service;

pub use audit_service::*;
pub use notification_service::*;
