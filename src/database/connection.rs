//! Connection descriptors and their redacted display form.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use std::sync::OnceLock;
use url::Url;

use crate::constants::database::{DEFAULT_HOST, REDACTED_PASSWORD};

/// Where to connect: a URL string or individual parameters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Connection {
    Url(String),
    Params(ConnectionParams),
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Connection {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// sqlx connect options for this descriptor.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match self {
            Self::Url(url) => PgConnectOptions::from_str(url),
            Self::Params(params) => {
                let mut options =
                    PgConnectOptions::new().host(non_empty(&params.host).unwrap_or(DEFAULT_HOST));
                if let Some(port) = params.port {
                    options = options.port(port);
                }
                if let Some(user) = non_empty(&params.user) {
                    options = options.username(user);
                }
                if let Some(password) = non_empty(&params.password) {
                    options = options.password(password);
                }
                if let Some(database) = non_empty(&params.database) {
                    options = options.database(database);
                }
                Ok(options)
            }
        }
    }

    /// Render for logs with any password replaced by `****`.
    pub fn format_redacted(&self) -> String {
        match self {
            Self::Url(url) => redact_url(url),
            Self::Params(params) => params.format_redacted(),
        }
    }
}

impl ConnectionParams {
    /// `//user:****@host:port/database`
    pub fn format_redacted(&self) -> String {
        let mut formatted = String::from("//");

        let user = non_empty(&self.user);
        let password = non_empty(&self.password);
        if user.is_some() || password.is_some() {
            formatted.push_str(user.unwrap_or_default());
            formatted.push(':');
            if password.is_some() {
                formatted.push_str(REDACTED_PASSWORD);
            }
            formatted.push('@');
        }

        formatted.push_str(non_empty(&self.host).unwrap_or(DEFAULT_HOST));
        if let Some(port) = self.port {
            formatted.push_str(&format!(":{port}"));
        }

        if let Some(database) = non_empty(&self.database) {
            if !database.starts_with('/') {
                formatted.push('/');
            }
            formatted.push_str(database);
        }

        formatted
    }
}

fn credentials_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"//([^:@/]*):[^@/]*@").expect("credentials pattern is valid")
    })
}

fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for URLs that cannot carry credentials at all.
                let _ = url.set_password(Some(REDACTED_PASSWORD));
            }
            url.to_string()
        }
        Err(_) => credentials_pattern()
            .replace(raw, format!("//${{1}}:{REDACTED_PASSWORD}@"))
            .into_owned(),
    }
}

/// Render a connection descriptor for logging, masking credentials.
pub fn format_connection(connection: &Connection) -> String {
    connection.format_redacted()
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_redacted())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Connection").field(&self.format_redacted()).finish()
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| REDACTED_PASSWORD))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
