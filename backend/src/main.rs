//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::io;
use std::path::Path;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use recipe_backend::outbound::security::HmacTokenIssuer;
use recipe_backend::settings::ServerSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let token_key = load_token_key(&settings)?;

    let mut config = ServerConfig::new(bind_addr, token_key);
    if let Some(database_url) = settings.database_url() {
        if settings.run_migrations {
            run_pending_migrations(database_url)
                .await
                .map_err(|err| io::Error::other(err.to_string()))?;
        }
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| io::Error::other(format!("database pool setup failed: {err}")))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "recipe book API listening");
    server.await
}

fn load_token_key(settings: &ServerSettings) -> io::Result<Vec<u8>> {
    let path = settings.token_key_file();
    match read_key(path) {
        Ok(key) => Ok(key),
        Err(e) if settings.ephemeral_key_permitted() => {
            warn!(path = %path.display(), error = %e, "using temporary token key (dev only)");
            Ok(HmacTokenIssuer::generate_key())
        }
        Err(e) => Err(io::Error::other(format!(
            "failed to read token key at {}: {e}",
            path.display()
        ))),
    }
}

fn read_key(path: &Path) -> io::Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "token key file is empty"));
    }
    Ok(bytes)
}
