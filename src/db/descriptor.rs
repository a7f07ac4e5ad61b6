use crate::error::StoreError;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::str::FromStr;
use url::Url;

const REDACTED: &str = "***";

/// A parsed `postgres://` connection string.
///
/// The raw string is handed to the driver unchanged; the parsed form is only
/// used to find the target database name and to reach the maintenance
/// database while the target may not exist yet.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    url: Url,
    options: PgConnectOptions,
    database: String,
}

impl ConnectionDescriptor {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let url = Url::parse(raw).map_err(|e| StoreError::InvalidDescriptor(e.to_string()))?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(StoreError::InvalidDescriptor(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let path = url.path().trim_start_matches('/');
        if path.is_empty() {
            return Err(StoreError::InvalidDescriptor(
                "missing database name in path".to_string(),
            ));
        }
        if path.contains('/') {
            return Err(StoreError::InvalidDescriptor(format!(
                "database path `{path}` has more than one segment"
            )));
        }

        let database = path.to_string();
        // Pin the driver to the same name provisioning creates.
        let options = PgConnectOptions::from_str(raw)
            .map_err(|e| StoreError::InvalidDescriptor(e.to_string()))?
            .database(&database);

        Ok(Self {
            url,
            options,
            database,
        })
    }

    /// Name of the target database: the URL path without its leading `/`.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Options for the target database, exactly as the string describes.
    pub fn connect_options(&self) -> PgConnectOptions {
        self.options.clone()
    }

    /// Same host and credentials, pointed at `maintenance` instead.
    pub fn maintenance_options(&self, maintenance: &str) -> PgConnectOptions {
        self.options.clone().database(maintenance)
    }

    /// The connection string with its password masked, for logs.
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some(REDACTED));
        }
        url.to_string()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("url", &self.redacted())
            .field("database", &self.database)
            .finish()
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
