//! Host credentials from the current user's `.netrc` file.
//!
//! This crate resolves the current OS user, parses `~/.netrc` once, and
//! answers username/password lookups by host.
//!
//! # Quick Start
//!
//! ```no_run
//! use netrc_auth::{Config, NetrcAuth};
//!
//! // ~/.netrc for the current user
//! let config = Config::resolve().unwrap();
//! let auth = NetrcAuth::new(config).unwrap();
//!
//! match auth.get_auth("api.example.com") {
//!     Ok(creds) => println!("Using basic auth: {}:***", creds.username),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! # File Format
//!
//! ```text
//! machine api.example.com
//! login alice
//! password s3cr3t
//! ```
//!
//! Lookups are exact, case-sensitive matches on the `machine` name. When a
//! host appears more than once, the first entry wins. A `default` entry is
//! parsed but never answers a lookup for an unknown host.
//!
//! # Testing Without the Real User
//!
//! [`Config::resolve_with`] accepts any [`UserLookup`], including a
//! [`User`] value or a closure, and [`NetrcAuth::from_netrc`] skips the
//! filesystem entirely:
//!
//! ```
//! use netrc_auth::{Config, Netrc, NetrcAuth, User};
//!
//! let config = Config::resolve_with(&User::new("alice", "/home/alice")).unwrap();
//! let netrc = Netrc::parse("machine example.com login u password p").unwrap();
//! let auth = NetrcAuth::from_netrc(config, netrc);
//!
//! let (username, password) = auth.get_auth("example.com").unwrap().into_pair();
//! assert_eq!((username.as_str(), password.as_str()), ("u", "p"));
//! ```

mod auth;
mod config;
mod error;
mod parser;
mod user;

pub use auth::{Authenticator, Credentials, NetrcAuth, PASSWORD_FIELD, USERNAME_FIELD};
pub use config::{Config, DEFAULT_FILENAME};
pub use error::{Error, Result, SyntaxError};
pub use parser::{Machine, Macro, Netrc};
pub use user::{SystemUser, User, UserLookup};
