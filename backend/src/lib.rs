//! Recipe book backend: accounts, recipe groups and recipes kept consistent
//! across transactional cascades.
//!
//! - [`domain`]: entities, services and the ports they talk through
//! - [`inbound`]: actix-web handlers translating HTTP into port calls
//! - [`outbound`]: PostgreSQL, in-memory and credential adapters

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
