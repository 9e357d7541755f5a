//! Current OS user resolution.
//!
//! The configuration resolver never queries the user database directly.
//! It goes through [`UserLookup`], so callers and tests can supply their
//! own user without touching the real environment.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// An OS user: account name and home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub home_dir: PathBuf,
}

impl User {
    pub fn new(name: impl Into<String>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home_dir: home_dir.into(),
        }
    }
}

/// Source of the current user's identity.
pub trait UserLookup {
    fn current_user(&self) -> Result<User>;
}

/// Looks up the user the process is running as.
///
/// - **Name**: the account name from the OS user database
/// - **Home**: `$HOME` on Unix, the profile folder on Windows
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUser;

impl UserLookup for SystemUser {
    fn current_user(&self) -> Result<User> {
        let name = whoami::fallible::username()
            .map_err(|e| Error::Environment(format!("unknown user name: {}", e)))?;
        let home_dir = dirs::home_dir().ok_or_else(|| {
            Error::Environment(format!("no home directory for user `{}`", name))
        })?;

        Ok(User { name, home_dir })
    }
}

impl UserLookup for User {
    fn current_user(&self) -> Result<User> {
        Ok(self.clone())
    }
}

impl<F> UserLookup for F
where
    F: Fn() -> Result<User>,
{
    fn current_user(&self) -> Result<User> {
        self()
    }
}
