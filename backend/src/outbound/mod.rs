//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL recipe book store using Diesel
//! - **memory**: in-process recipe book store for tests and development
//! - **security**: Argon2 password hashing and HS256 bearer tokens
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod memory;
pub mod persistence;
pub mod security;
