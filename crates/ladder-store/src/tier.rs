//! Tier catalogue and item categories
//!
//! Tiers are a fixed, ordered ladder of five levels. Every profile keys its
//! item lists by [`TierId`], and every list belongs to one [`Category`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of tiers in the ladder
pub const TIER_COUNT: u8 = 5;

/// Identifier of one tier (1..=5)
///
/// Serialized as a bare integer; as a JSON map key it becomes `"1"`..`"5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TierId(u8);

impl TierId {
    /// First (lowest) tier
    pub const FIRST: Self = Self(1);

    /// Last (highest) tier
    pub const LAST: Self = Self(TIER_COUNT);

    /// Create a tier id, rejecting values outside the catalogue
    pub fn new(id: u8) -> Result<Self, TierError> {
        if (1..=TIER_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(TierError::OutOfRange(id))
        }
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Display name from the catalogue
    #[must_use]
    pub fn name(self) -> &'static str {
        TIER_CATALOGUE[usize::from(self.0 - 1)].name
    }

    /// Next tier up, saturating at the top of the ladder
    #[inline]
    #[must_use]
    pub fn next_saturating(self) -> Self {
        Self((self.0 + 1).min(TIER_COUNT))
    }

    /// All tiers in ladder order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=TIER_COUNT).map(Self)
    }
}

impl TryFrom<u8> for TierId {
    type Error = TierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TierId> for u8 {
    fn from(id: TierId) -> Self {
        id.0
    }
}

impl Display for TierId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TierId {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u8 = s
            .trim()
            .parse()
            .map_err(|_| TierError::Unparseable(s.to_string()))?;
        Self::new(id)
    }
}

/// Tier id errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    /// Id outside 1..=5
    #[error("tier {0} is outside 1..={max}", max = TIER_COUNT)]
    OutOfRange(u8),

    /// Not a number
    #[error("'{0}' is not a tier number")]
    Unparseable(String),
}

/// Catalogue entry for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierInfo {
    /// Tier id
    pub id: u8,
    /// Display name
    pub name: &'static str,
}

/// The fixed tier ladder, lowest first
pub const TIER_CATALOGUE: [TierInfo; TIER_COUNT as usize] = [
    TierInfo { id: 1, name: "Self-Care Rookie" },
    TierInfo { id: 2, name: "Room Captain" },
    TierInfo { id: 3, name: "Household Contributor" },
    TierInfo { id: 4, name: "School & Schedule Boss" },
    TierInfo { id: 5, name: "Young-Adult Mode" },
];

/// Item category within a tier
///
/// Responsibilities and privileges are independent namespaces: the same
/// text may appear in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Things the child does; can be mastered
    Responsibilities,
    /// Things the child earns
    Privileges,
}

impl Category {
    /// Wire name (`responsibilities` / `privileges`)
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Responsibilities => "responsibilities",
            Self::Privileges => "privileges",
        }
    }

    /// Singular noun for user-facing messages
    #[inline]
    #[must_use]
    pub fn singular(self) -> &'static str {
        match self {
            Self::Responsibilities => "responsibility",
            Self::Privileges => "privilege",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "responsibilities" | "responsibility" | "resp" => Ok(Self::Responsibilities),
            "privileges" | "privilege" | "priv" => Ok(Self::Privileges),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_id_range() {
        assert!(TierId::new(0).is_err());
        assert!(TierId::new(1).is_ok());
        assert!(TierId::new(5).is_ok());
        assert_eq!(TierId::new(6), Err(TierError::OutOfRange(6)));
    }

    #[test]
    fn tier_names_follow_catalogue() {
        assert_eq!(TierId::FIRST.name(), "Self-Care Rookie");
        assert_eq!(TierId::LAST.name(), "Young-Adult Mode");
        assert_eq!(TierId::all().count(), 5);
    }

    #[test]
    fn tier_next_saturates() {
        assert_eq!(TierId::FIRST.next_saturating().get(), 2);
        assert_eq!(TierId::LAST.next_saturating(), TierId::LAST);
    }

    #[test]
    fn tier_from_str() {
        assert_eq!("3".parse::<TierId>().unwrap().get(), 3);
        assert!(matches!("x".parse::<TierId>(), Err(TierError::Unparseable(_))));
    }

    #[test]
    fn category_parse_and_display() {
        assert_eq!("resp".parse::<Category>().unwrap(), Category::Responsibilities);
        assert_eq!("Privileges".parse::<Category>().unwrap(), Category::Privileges);
        assert!("chores".parse::<Category>().is_err());
        assert_eq!(Category::Privileges.to_string(), "privileges");
        assert_eq!(Category::Responsibilities.singular(), "responsibility");
    }
}
