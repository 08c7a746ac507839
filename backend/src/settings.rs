//! Server settings loaded via OrthoConfig.
//!
//! Values come from the command line, `RECIPE_BOOK_*` environment variables
//! or a configuration file, in that order of precedence.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_KEY_FILE: &str = "/var/run/secrets/token_key";

/// Settings controlling how the server binds, stores data and signs tokens.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE_BOOK")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without one the server keeps its data
    /// in memory.
    pub database_url: Option<String>,
    /// File holding the token signing key.
    pub token_key_file: Option<PathBuf>,
    /// Sign tokens with a random key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_token_key: bool,
    /// Apply pending migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    /// Database URL, treating a blank value as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn token_key_file(&self) -> &Path {
        self.token_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_KEY_FILE))
    }

    /// Whether a missing key file may be replaced by a random key. Always
    /// true in debug builds.
    pub fn ephemeral_key_permitted(&self) -> bool {
        cfg!(debug_assertions) || self.allow_ephemeral_token_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "RECIPE_BOOK_BIND_ADDR",
        "RECIPE_BOOK_DATABASE_URL",
        "RECIPE_BOOK_TOKEN_KEY_FILE",
        "RECIPE_BOOK_ALLOW_EPHEMERAL_TOKEN_KEY",
        "RECIPE_BOOK_RUN_MIGRATIONS",
    ];

    fn load(args: &[&str]) -> ServerSettings {
        let argv = std::iter::once(OsString::from("recipe-backend"))
            .chain(args.iter().map(OsString::from));
        ServerSettings::load_from_iter(argv).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load(&[]);
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.token_key_file(), Path::new(DEFAULT_TOKEN_KEY_FILE));
        assert!(!settings.allow_ephemeral_token_key);
        assert!(settings.run_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("RECIPE_BOOK_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "RECIPE_BOOK_DATABASE_URL",
                Some("postgres://localhost/recipes".to_owned()),
            ),
            ("RECIPE_BOOK_TOKEN_KEY_FILE", Some("/tmp/key".to_owned())),
            ("RECIPE_BOOK_ALLOW_EPHEMERAL_TOKEN_KEY", Some("true".to_owned())),
            ("RECIPE_BOOK_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load(&[]);
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/recipes"));
        assert_eq!(settings.token_key_file(), Path::new("/tmp/key"));
        assert!(settings.allow_ephemeral_token_key);
        assert!(!settings.run_migrations);
        assert!(settings.ephemeral_key_permitted());
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env([("RECIPE_BOOK_DATABASE_URL", Some("  ".to_owned()))]);

        assert!(load(&[]).database_url().is_none());
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let _guard = lock_env([("RECIPE_BOOK_BIND_ADDR", Some("not an address".to_owned()))]);

        assert!(load(&[]).bind_addr().is_err());
    }
}
