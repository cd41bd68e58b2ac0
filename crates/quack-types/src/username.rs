//! Username validation.
//!
//! A username ends up inside file names (`<username>_<id>.<ext>`, counter
//! files) and inside every record format, so it must not contain any of the
//! record separators or path syntax:
//! - Must be non-empty and at most [`Username::MAX_LEN`] bytes
//! - Must not contain whitespace, control characters, `:`, `;`, `,`, `/`, `\`
//! - Must not start with `.` or contain `..`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a username.
const FORBIDDEN_CHARS: &[char] = &[':', ';', ',', '/', '\\'];

/// A validated account name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Longest accepted username, in bytes.
    pub const MAX_LEN: usize = 64;

    /// Validate and wrap a username.
    ///
    /// # Examples
    ///
    /// ```
    /// use quack_types::Username;
    ///
    /// assert!(Username::new("alice").is_ok());
    /// assert!(Username::new("duck_42").is_ok());
    /// assert!(Username::new("").is_err());
    /// assert!(Username::new("a:b").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidUsername {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("username must not be empty".into()));
    }
    if name.len() > Username::MAX_LEN {
        return Err(invalid(format!(
            "longer than {} bytes",
            Username::MAX_LEN
        )));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if name.starts_with('.') {
        return Err(invalid("must not start with '.'".into()));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }
    Ok(())
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl PartialEq<str> for Username {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Username {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
