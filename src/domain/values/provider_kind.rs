use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which embedding capability to run.
///
/// `Auto` tries the remote provider first and settles on the local one if the
/// remote provider cannot be initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Auto,
    #[serde(rename = "openai", alias = "remote")]
    Remote,
    Local,
    Hashing,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Auto => write!(f, "auto"),
            ProviderKind::Remote => write!(f, "openai"),
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Hashing => write!(f, "hashing"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ProviderKind::Auto),
            "openai" | "remote" => Ok(ProviderKind::Remote),
            "local" => Ok(ProviderKind::Local),
            "hashing" => Ok(ProviderKind::Hashing),
            _ => Err(format!("Unknown embedding provider: {s}")),
        }
    }
}
