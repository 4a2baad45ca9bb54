//! Quote requests: the secondary contact record with a follow-up status.
//! Not wired to the notification pipeline.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::QuoteService;
