//! Provider identifiers and selection parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower-case provider identifier, e.g. `aws` or `gcp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

#[derive(Debug, Error, PartialEq)]
pub enum ProviderError {
    #[error("empty provider name")]
    Empty,
    #[error("invalid provider name: {0:?} (use letters, digits, '-' or '_')")]
    InvalidName(String),
    #[error("unknown provider: {name} (configured: {known})")]
    Unknown { name: String, known: String },
}

impl ProviderId {
    pub fn parse(name: &str) -> Result<Self, ProviderError> {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(ProviderError::Empty);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ProviderError::InvalidName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProviderId {
    type Error = ProviderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

/// Which providers a query runs over.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSelection {
    /// Every configured provider, in configuration order.
    All,
    /// An explicit subset, in the order given.
    Only(Vec<ProviderId>),
}

impl ProviderSelection {
    /// Parse a comma separated list such as `aws,gcp`, or `all`.
    pub fn parse(list: &str) -> Result<Self, ProviderError> {
        if list.trim().eq_ignore_ascii_case("all") {
            return Ok(ProviderSelection::All);
        }
        let mut ids: Vec<ProviderId> = Vec::new();
        for part in list.split(',') {
            let id = ProviderId::parse(part)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ProviderSelection::Only(ids))
    }

    /// Resolve against the configured providers, keeping registration order for `All`.
    pub fn resolve(&self, configured: &[ProviderId]) -> Result<Vec<ProviderId>, ProviderError> {
        match self {
            ProviderSelection::All => Ok(configured.to_vec()),
            ProviderSelection::Only(ids) => {
                for id in ids {
                    if !configured.contains(id) {
                        return Err(ProviderError::Unknown {
                            name: id.to_string(),
                            known: configured
                                .iter()
                                .map(ProviderId::as_str)
                                .collect::<Vec<_>>()
                                .join(", "),
                        });
                    }
                }
                Ok(ids.clone())
            }
        }
    }
}
