//! Retention limits for the bounded store.

use serde::Deserialize;

/// Default cap on retained blocks.
pub const DEFAULT_MAX_BLOCKS: usize = 120;

/// Default cap on the global recent-transaction list.
pub const DEFAULT_MAX_RECENT_TRANSACTIONS: usize = 250;

/// Default cap on each account's inbound and outbound lists.
pub const DEFAULT_ACCOUNT_ACTIVITY_CAP: usize = 25;

/// Default cap on each account's recent block list.
pub const DEFAULT_ACCOUNT_BLOCK_CAP: usize = 10;

/// Caps applied by [`BoundedStateStore`](crate::BoundedStateStore).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreLimits {
    /// Maximum number of retained blocks
    pub max_blocks: usize,
    /// Maximum length of the recent-transaction list
    pub max_recent_transactions: usize,
    /// Maximum length of each account's inbound/outbound list
    pub account_activity_cap: usize,
    /// Maximum length of each account's recent block list
    pub account_block_cap: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_blocks: DEFAULT_MAX_BLOCKS,
            max_recent_transactions: DEFAULT_MAX_RECENT_TRANSACTIONS,
            account_activity_cap: DEFAULT_ACCOUNT_ACTIVITY_CAP,
            account_block_cap: DEFAULT_ACCOUNT_BLOCK_CAP,
        }
    }
}

impl StoreLimits {
    /// Limits with a custom block cap and default list caps.
    pub fn with_max_blocks(max_blocks: usize) -> Self {
        Self {
            max_blocks,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = StoreLimits::default();
        assert_eq!(limits.max_blocks, 120);
        assert_eq!(limits.max_recent_transactions, 250);
        assert_eq!(limits.account_activity_cap, 25);
        assert_eq!(limits.account_block_cap, 10);
    }

    #[test]
    fn test_with_max_blocks() {
        let limits = StoreLimits::with_max_blocks(10);
        assert_eq!(limits.max_blocks, 10);
        assert_eq!(limits.account_block_cap, DEFAULT_ACCOUNT_BLOCK_CAP);
    }
}
