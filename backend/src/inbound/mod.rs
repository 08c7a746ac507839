//! Inbound adapters translating external requests into domain calls.
//!
//! Only HTTP exists today; framework types stay inside [`http`].

pub mod http;
