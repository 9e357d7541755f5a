//! Configuration for the netrc authenticator.
//!
//! A [`Config`] names the user whose home directory holds the netrc file,
//! and the file's name within it.

use crate::error::Result;
use crate::user::{SystemUser, User, UserLookup};
use std::path::PathBuf;

/// The default name of the netrc file.
pub const DEFAULT_FILENAME: &str = ".netrc";

/// Where to find the netrc file.
///
/// # Examples
///
/// ```no_run
/// use netrc_auth::Config;
///
/// // ~/.netrc for the current user
/// let config = Config::resolve()?;
///
/// // ~/.netrc-work instead
/// let config = config.with_filename(".netrc-work");
/// # Ok::<(), netrc_auth::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    user: User,
    filename: String,
}

impl Config {
    /// Build a config for an explicit user and filename.
    pub fn new(user: User, filename: impl Into<String>) -> Self {
        Self {
            user,
            filename: filename.into(),
        }
    }

    /// Resolve the config for the user the process runs as.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with(&SystemUser)
    }

    /// Resolve the config through a custom user lookup.
    ///
    /// Returns `Err(Error::Environment)` if the lookup cannot produce a user.
    pub fn resolve_with(lookup: &impl UserLookup) -> Result<Self> {
        let user = lookup.current_user()?;
        Ok(Self::new(user, DEFAULT_FILENAME))
    }

    /// Replace the filename. An absolute path replaces the home directory too.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the netrc file (`{home}/{filename}`).
    pub fn netrc_path(&self) -> PathBuf {
        self.user.home_dir.join(&self.filename)
    }
}
