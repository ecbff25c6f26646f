//! Vault owners.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity tag carried by every folder and file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vault_owner")]
pub enum Owner {
    Wise,
    Belle,
    Phaethon,
}

impl Owner {
    /// Every owner, in declaration order.
    pub const ALL: [Owner; 3] = [Owner::Wise, Owner::Belle, Owner::Phaethon];

    /// Return the owner as it is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wise => "Wise",
            Self::Belle => "Belle",
            Self::Phaethon => "Phaethon",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Owner {
    type Err = vault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|owner| owner.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                vault_core::AppError::validation(format!(
                    "Invalid owner: '{s}'. Expected one of: Wise, Belle, Phaethon"
                ))
            })
    }
}
