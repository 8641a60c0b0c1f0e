//! Connection string parsing.
//!
//! Connection strings look like
//! `<scheme>://[user[:password]@][host[:port]]/<database>`. The scheme selects
//! the engine; the remaining parts are handed to the engine's constructor.

use crate::error::{DbError, DbResult};
use std::fmt;
use url::Url;

/// Parsed connection string
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Engine selector (`sqlite`, `postgresql`, ...)
    pub scheme: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Path with its leading `/` removed: a file path for file-based engines,
    /// a database name for networked ones
    pub database: String,
}

fn decode(part: &str, what: &str) -> DbResult<String> {
    urlencoding::decode(part)
        .map(|s| s.into_owned())
        .map_err(|e| DbError::InvalidConnectionString(format!("{what} is not valid UTF-8: {e}")))
}

impl ConnectionInfo {
    /// Parse a connection string.
    ///
    /// `sqlite:///:memory:` yields database `:memory:`, `sqlite:////var/db/app.db`
    /// yields the absolute path `/var/db/app.db`.
    pub fn parse(connection_string: &str) -> DbResult<Self> {
        let url = Url::parse(connection_string.trim())
            .map_err(|e| DbError::InvalidConnectionString(e.to_string()))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        let user = match url.username() {
            "" => None,
            name => Some(decode(name, "user name")?),
        };
        let password = url
            .password()
            .map(|p| decode(p, "password"))
            .transpose()?;
        let path = url.path();
        let database = decode(path.strip_prefix('/').unwrap_or(path), "database")?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
            user,
            password,
            database,
        })
    }

    /// True for sqlite/duckdb style in-memory databases
    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:"
    }
}

impl fmt::Display for ConnectionInfo {
    /// Render the connection string with the password masked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(user) = &self.user {
            write!(f, "{}", user)?;
            if self.password.is_some() {
                write!(f, ":***")?;
            }
            write!(f, "@")?;
        }
        if let Some(host) = &self.host {
            write!(f, "{}", host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "/{}", self.database)
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
