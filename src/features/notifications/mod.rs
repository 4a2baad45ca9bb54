//! The lead notification pipeline.
//!
//! A datasheet request tied to a product produces exactly one email: the
//! datasheet link when the product carries one, an unavailability notice
//! otherwise. The pipeline audits before acting, never sends for other
//! lead types, and flags the lead once the email is out.
//!
//! Entry points: the HTTP function (`/functions/send-tech-sheet`), the
//! admin manual trigger, and the change-feed watcher for fresh inserts.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod templates;
pub mod workers;

pub use services::{NotificationService, SecurityAuditService};
pub use workers::LeadWatcher;
