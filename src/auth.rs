//! Credential lookup for hosts.
//!
//! [`Authenticator`] is the seam for credential backends. [`NetrcAuth`] is
//! the netrc-file backed implementation: it parses the file once when it is
//! built and answers every later query from memory.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::Netrc;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// The netrc field that holds the username.
pub const USERNAME_FIELD: &str = "login";

/// The netrc field that holds the password.
pub const PASSWORD_FIELD: &str = "password";

/// A username/password pair for one host.
///
/// Missing fields are empty strings. The `Debug` implementation redacts
/// the password, and `PartialEq` is intentionally not implemented.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Split into `(username, password)`.
    pub fn into_pair(self) -> (String, String) {
        (self.username, self.password)
    }
}

impl From<Credentials> for (String, String) {
    fn from(creds: Credentials) -> Self {
        creds.into_pair()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A source of per-host credentials.
pub trait Authenticator: Sized {
    type Config;

    /// Build the authenticator, loading whatever backing store it needs.
    fn create(config: Self::Config) -> Result<Self>;

    /// Credentials for `host`, or `Err(Error::NoAuth)` if none are configured.
    fn get_auth(&self, host: &str) -> Result<Credentials>;
}

/// Authenticator backed by the user's netrc file.
///
/// # Examples
///
/// ```no_run
/// use netrc_auth::{Config, NetrcAuth};
///
/// let auth = NetrcAuth::new(Config::resolve()?)?;
/// let (username, password) = auth.get_auth("api.example.com")?.into_pair();
/// # Ok::<(), netrc_auth::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NetrcAuth {
    config: Config,
    path: PathBuf,
    netrc: Netrc,
}

impl NetrcAuth {
    /// Read and parse `{home}/{filename}` from `config`.
    ///
    /// Fails with `Error::FileNotFound` or `Error::ReadFile` if the file
    /// can't be read, and with `Error::Format` if it isn't valid netrc.
    pub fn new(config: Config) -> Result<Self> {
        let path = config.netrc_path();
        let netrc = Netrc::load(&path)?;

        tracing::debug!(
            path = %path.display(),
            machines = netrc.machines().len(),
            "parsed netrc file"
        );

        Ok(NetrcAuth {
            config,
            path,
            netrc,
        })
    }

    /// Build over an already parsed store, without touching the filesystem.
    pub fn from_netrc(config: Config, netrc: Netrc) -> Self {
        let path = config.netrc_path();
        NetrcAuth {
            config,
            path,
            netrc,
        }
    }

    /// Credentials for the machine named exactly `host`.
    ///
    /// No normalization is applied: matching is case-sensitive, and the
    /// `default` entry is not consulted.
    pub fn get_auth(&self, host: &str) -> Result<Credentials> {
        match self.netrc.machine(host) {
            Some(machine) => {
                tracing::trace!(host, "netrc entry found");
                Ok(Credentials::new(
                    machine.get(USERNAME_FIELD),
                    machine.get(PASSWORD_FIELD),
                ))
            }
            None => {
                tracing::trace!(host, "no netrc entry");
                Err(Error::NoAuth(host.to_string()))
            }
        }
    }

    /// Credentials for the host of `url`.
    ///
    /// IPv6 hosts are looked up in their bracketed form (`[::1]`).
    pub fn get_auth_for_url(&self, url: &Url) -> Result<Credentials> {
        self.get_auth(url.host_str().unwrap_or(""))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path the netrc file was (or would be) loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn netrc(&self) -> &Netrc {
        &self.netrc
    }
}

impl Authenticator for NetrcAuth {
    type Config = Config;

    fn create(config: Config) -> Result<Self> {
        NetrcAuth::new(config)
    }

    fn get_auth(&self, host: &str) -> Result<Credentials> {
        NetrcAuth::get_auth(self, host)
    }
}
