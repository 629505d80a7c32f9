//! # Value Types
//!
//! Small guarded primitives used throughout the engine.
//!
//! Each type wraps a primitive and can only be obtained through a checked
//! constructor (`parse`, `new`, `TryFrom`). Serde goes through the same checks,
//! so a payload that deserializes is already valid.
//!
//! | Type | Underlying | Rule |
//! |------|------------|------|
//! | [`Hash`] | `String` | `0x` + 64 lowercase hex digits |
//! | [`Address`] | `String` | `0x` + 40 lowercase hex digits |
//! | [`AtomicAmount`] | `u64` | non-negative integer atomic units |
//! | [`Height`] | `NonZeroU64` | strictly positive |
//! | [`TimestampMs`] | `u64` | milliseconds since the Unix epoch |
//! | [`CommitteeId`] | `String` | `validator-<index>` |

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::time::{SystemTime, UNIX_EPOCH};

/// Atomic units in one display unit of the ledger currency.
pub const ATOMIC_UNITS_PER_COIN: u64 = 1_000_000;

/// Number of hex digits in a hash.
pub const HASH_HEX_LEN: usize = 64;

/// Number of hex digits in an address.
pub const ADDRESS_HEX_LEN: usize = 40;

const COMMITTEE_PREFIX: &str = "validator-";

/// Check `0x` + `digits` hex characters and return the lower-cased form.
fn normalize_hex(raw: &str, digits: usize) -> Option<String> {
    let body = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if body.len() != digits || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", body.to_ascii_lowercase()))
}

// =============================================================================
// HASH
// =============================================================================

/// A 32-byte block or transaction hash in `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash(String);

impl Hash {
    /// Parse and normalize a hash string.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        normalize_hex(raw, HASH_HEX_LEN)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidHash {
                value: raw.to_string(),
            })
    }

    /// Build a hash from raw digest bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines (`0x1234abcd…`).
    pub fn short(&self) -> &str {
        &self.0[..10]
    }
}

impl TryFrom<String> for Hash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Hash> for String {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ADDRESS
// =============================================================================

/// A 20-byte account address in `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse an address, accepting upper-case hex and normalizing it.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        normalize_hex(raw, ADDRESS_HEX_LEN)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidAddress {
                value: raw.to_string(),
            })
    }

    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// AMOUNTS
// =============================================================================

/// A non-negative quantity of atomic units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AtomicAmount(u64);

impl AtomicAmount {
    pub const ZERO: Self = Self(0);

    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Whole display units converted to atomic units.
    pub const fn from_coins(coins: u64) -> Self {
        Self(coins.saturating_mul(ATOMIC_UNITS_PER_COIN))
    }

    /// Parse a wire amount: a JSON integer or a decimal string.
    ///
    /// Negative, fractional and non-numeric values are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAmount {
            value: value.to_string(),
        };
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(Self).ok_or_else(invalid),
            serde_json::Value::String(s) => s.trim().parse::<u64>().map(Self).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub const fn units(self) -> u64 {
        self.0
    }

    /// Subtract, clamping at zero.
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Value in display units (lossy, for logging and statistics).
    pub fn as_coins(self) -> f64 {
        self.0 as f64 / ATOMIC_UNITS_PER_COIN as f64
    }
}

impl std::iter::Sum for AtomicAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for AtomicAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// HEIGHT / TIME
// =============================================================================

/// A block height. Genesis is height 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Height(NonZeroU64);

impl Height {
    pub const GENESIS: Self = Self(NonZeroU64::MIN);

    pub fn new(value: u64) -> Result<Self, ValidationError> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or(ValidationError::ZeroHeight)
    }

    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// The next height. Saturates at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u64> for Height {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Height> for u64 {
    fn from(height: Height) -> Self {
        height.get()
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimestampMs(u64);

impl TimestampMs {
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Wall-clock time. A clock before 1970 reads as zero.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn saturating_sub_ms(self, ms: u64) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    pub const fn saturating_add_ms(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

// =============================================================================
// COMMITTEE
// =============================================================================

/// Opaque identifier of a committee member (`validator-<n>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitteeId(String);

impl CommitteeId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("{COMMITTEE_PREFIX}{index}"))
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let valid = raw
            .strip_prefix(COMMITTEE_PREFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidCommitteeId {
                value: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitteeId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommitteeId> for String {
    fn from(id: CommitteeId) -> Self {
        id.0
    }
}

impl fmt::Display for CommitteeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
