//! Back office statistics derived from the leads and products tables

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::StatsService;
