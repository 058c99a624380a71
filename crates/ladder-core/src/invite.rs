//! Parent-issued invitation codes linking a child account to a profile

use crate::error::{InviteError, LadderError, LadderResult};
use crate::types::UserId;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters an invite code is drawn from
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Invite code length
pub const CODE_LENGTH: usize = 6;

/// Six uppercase letters or digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    /// Draw a fresh code
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Code text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for InviteCode {
    type Err = InviteError;

    /// Accepts surrounding whitespace and lowercase input
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            Ok(Self(code))
        } else {
            Err(InviteError::InvalidCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for InviteCode {
    type Error = InviteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invitation record as stored by the invite collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    /// Redemption code
    pub code: InviteCode,
    /// Account owning the store
    pub parent_uid: UserId,
    /// Profile the child is linked to
    pub kid_name: String,
    /// Issue time
    pub created_at: DateTime<Utc>,
    /// Last valid instant
    pub expires_at: DateTime<Utc>,
    /// Child account that redeemed the code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_uid: Option<UserId>,
}

/// What a successful redemption grants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteClaim {
    /// Store to load
    pub parent_uid: UserId,
    /// Profile to select
    pub kid_name: String,
}

impl Invitation {
    /// Issue a new invitation valid for `ttl` from `now`
    ///
    /// # Errors
    /// [`LadderError::Config`] if the expiry is not a representable instant
    pub fn issue(
        parent_uid: UserId,
        kid_name: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> LadderResult<Self> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| LadderError::config("invitation expiry out of range"))?;
        Ok(Self {
            code: InviteCode::generate(&mut rand::rng()),
            parent_uid,
            kid_name: kid_name.into(),
            created_at: now,
            expires_at,
            child_uid: None,
        })
    }

    /// Past its expiry at `now`
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Claimed by a child
    #[inline]
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.child_uid.is_some()
    }

    /// Mark as used by `child` and return the link it grants
    ///
    /// The child that claimed the code keeps its link: redeeming again as
    /// that child succeeds, expired or not.
    ///
    /// # Errors
    /// [`InviteError::AlreadyUsed`] if claimed by another child,
    /// [`InviteError::Expired`] if unclaimed and past expiry; the invitation
    /// is left untouched on error
    pub fn redeem(&mut self, child: UserId, now: DateTime<Utc>) -> Result<InviteClaim, InviteError> {
        match &self.child_uid {
            Some(linked) if *linked == child => {}
            Some(_) => {
                return Err(InviteError::AlreadyUsed {
                    code: self.code.to_string(),
                });
            }
            None if self.is_expired(now) => {
                return Err(InviteError::Expired {
                    code: self.code.to_string(),
                });
            }
            None => self.child_uid = Some(child),
        }
        Ok(InviteClaim {
            parent_uid: self.parent_uid.clone(),
            kid_name: self.kid_name.clone(),
        })
    }
}
