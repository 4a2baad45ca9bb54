//! Mailer module for transactional email
//!
//! Provides the email provider boundary and its Resend-compatible
//! HTTP implementation.

mod resend_client;

pub use resend_client::{EmailSender, OutgoingEmail, ResendClient, SendReceipt};
