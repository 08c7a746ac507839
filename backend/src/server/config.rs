//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use recipe_backend::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Where recipe book data lives for this process.
pub enum StorageBackend {
    Postgres(DbPool),
    /// Data is lost on restart.
    Memory,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_key: Zeroizing<Vec<u8>>,
    pub(crate) storage: StorageBackend,
}

impl ServerConfig {
    /// Configuration backed by the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_key: Vec<u8>) -> Self {
        Self {
            bind_addr,
            token_key: Zeroizing::new(token_key),
            storage: StorageBackend::Memory,
        }
    }

    /// Persist through PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.storage = StorageBackend::Postgres(pool);
        self
    }
}
