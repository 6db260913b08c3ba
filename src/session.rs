//! The caller's identity, passed explicitly into every ledger read and write.

use crate::error::{ErrorType, IntoResult, Res};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies whose rows are read and written in a multi-user ledger. Always lowercase, trimmed
/// and non-empty.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    pub fn new(s: impl AsRef<str>) -> Res<Self> {
        let owner = s.as_ref().trim().to_lowercase();
        if owner.is_empty() {
            bail!("An owner must not be empty");
        }
        Ok(Self(owner))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for Owner {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Owner::new(s).map_err(serde::de::Error::custom)
    }
}

/// The request context. A session without an owner reads every row.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Session {
    owner: Option<Owner>,
}

impl Session {
    pub fn new(owner: Option<Owner>) -> Self {
        Self { owner }
    }

    /// Builds a session from optional user input. Blank input means no owner.
    pub fn from_input(owner: Option<&str>) -> Res<Self> {
        match owner.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Ok(Self::new(Some(Owner::new(s)?))),
            None => Ok(Self::default()),
        }
    }

    /// Like `from_input`, for the command line and MCP layers.
    pub fn parse(owner: Option<&str>) -> crate::Result<Self> {
        Self::from_input(owner).pub_result(ErrorType::Request)
    }

    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// Checks that the session can write to a ledger: multi-user ledgers need an owner for the
    /// owner column, single-user ledgers have no owner column.
    pub fn check_writable(&self, multi_user: bool) -> Res<()> {
        match (multi_user, &self.owner) {
            (true, None) => bail!("An owner is required to write to a multi-user ledger"),
            (false, Some(owner)) => bail!(
                "The owner '{owner}' was given but the ledger is not configured for multiple users"
            ),
            _ => Ok(()),
        }
    }
}
