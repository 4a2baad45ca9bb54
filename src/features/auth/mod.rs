//! Admin authentication: email/password sign-in backed by the admin_users
//! table, HS256 session tokens, and the middleware-side admin gate.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/login` | No | Sign in, returns a session token |
//! | GET | `/api/auth/me` | Yes | Current admin identity |

pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::AuthService;
