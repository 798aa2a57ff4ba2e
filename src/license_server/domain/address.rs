//! Network address of a license manager and the usage database location.

use super::LicenseServerDomainError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum host length, matching `VARCHAR(64)`.
const MAX_HOST_LENGTH: usize = 64;

/// Maximum usage database path length, matching `VARCHAR(255)`.
const MAX_USAGE_DATABASE_PATH_LENGTH: usize = 255;

/// Host and port of a license manager daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Creates a validated server address.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerDomainError`] when the host is blank, too long,
    /// contains whitespace or `@`, or when the port is zero.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, LicenseServerDomainError> {
        let normalized = host.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(LicenseServerDomainError::EmptyHost);
        }
        if normalized.chars().count() > MAX_HOST_LENGTH {
            return Err(LicenseServerDomainError::HostTooLong(normalized));
        }
        if normalized
            .chars()
            .any(|character| character.is_whitespace() || character == '@')
        {
            return Err(LicenseServerDomainError::InvalidHost(normalized));
        }
        if port == 0 {
            return Err(LicenseServerDomainError::InvalidPort);
        }

        Ok(Self {
            host: normalized,
            port,
        })
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the `port@host` license path understood by license managers.
    #[must_use]
    pub fn license_path(&self) -> String {
        format!("{}@{}", self.port, self.host)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}@{}", self.port, self.host)
    }
}

/// Location of a server's round-robin usage database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageDatabasePath(Utf8PathBuf);

impl UsageDatabasePath {
    /// Parses an optional usage database path.
    ///
    /// Blank input means "no historical usage" and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerDomainError::UsageDatabasePathTooLong`] when the
    /// trimmed path exceeds 255 characters.
    pub fn parse_optional(
        value: impl Into<String>,
    ) -> Result<Option<Self>, LicenseServerDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Ok(None);
        }
        if normalized.chars().count() > MAX_USAGE_DATABASE_PATH_LENGTH {
            return Err(LicenseServerDomainError::UsageDatabasePathTooLong(
                normalized,
            ));
        }
        Ok(Some(Self(Utf8PathBuf::from(normalized))))
    }

    /// Returns the path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<Utf8Path> for UsageDatabasePath {
    fn as_ref(&self) -> &Utf8Path {
        self.as_path()
    }
}

impl fmt::Display for UsageDatabasePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
