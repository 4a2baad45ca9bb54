mod quote_request;

pub use quote_request::*;
