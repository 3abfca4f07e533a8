//! Connection parameters handed to the engine when opening a connection.

use std::fmt;
use std::time::Duration;

use crate::protocol::constants::*;

/// Connection parameters.
#[derive(Clone)]
pub struct ConnectParams {
    /// Host address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password. Never logged or printed by `Debug`.
    pub password: String,
    /// Default database, if any.
    pub database: Option<String>,
    /// Unix socket path; takes precedence over host/port when set.
    pub unix_socket: Option<String>,
    /// Connection character set.
    pub charset: String,
    /// Client capability flags (`CLIENT_*`).
    pub flags: u64,
    /// Connect timeout, enforced by the engine.
    pub connect_timeout: Option<Duration>,
}

impl ConnectParams {
    /// Create new connection parameters with the default port and charset.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            database: None,
            unix_socket: None,
            charset: DEFAULT_CHARSET.to_string(),
            flags: 0,
            connect_timeout: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_unix_socket(mut self, path: impl Into<String>) -> Self {
        self.unix_socket = Some(path.into());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Replace the client flags.
    pub fn with_flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    /// Set the connection timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use mysql_rowbind::ConnectParams;
    /// use std::time::Duration;
    ///
    /// let params = ConnectParams::new("localhost", "app", "secret")
    ///     .with_connect_timeout(Duration::from_secs(5));
    /// assert_eq!(params.connect_timeout, Some(Duration::from_secs(5)));
    /// ```
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Allow several `;`-separated statements per query.
    pub fn enable_multi_statements(mut self) -> Self {
        self.flags |= CLIENT_MULTI_STATEMENTS;
        self
    }

    pub fn multi_statements(&self) -> bool {
        self.flags & CLIENT_MULTI_STATEMENTS != 0
    }

    /// A copy with the password masked.
    pub fn redacted(&self) -> Self {
        Self {
            password: "***".to_string(),
            ..self.clone()
        }
    }

    /// `host:port` or the socket path, for log fields.
    pub fn address(&self) -> String {
        match &self.unix_socket {
            Some(path) => path.clone(),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("unix_socket", &self.unix_socket)
            .field("charset", &self.charset)
            .field("flags", &self.flags)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
