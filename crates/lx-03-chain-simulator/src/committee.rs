//! Committee rotation.
//!
//! ```text
//! pool (24 ids) ──shuffle──→ first 8 = active committee
//!                 every ROTATION_INTERVAL blocks, replaced wholesale
//! ```

use crate::rng::DeterministicRng;
use shared_types::{CommitteeId, COMMITTEE_SIZE};

/// Identifiers the committee is drawn from.
pub const COMMITTEE_POOL_SIZE: usize = 24;

/// Blocks between rotations.
pub const ROTATION_INTERVAL: u64 = 32;

#[derive(Clone, Debug)]
pub struct CommitteeSchedule {
    pool: Vec<CommitteeId>,
    active: Vec<CommitteeId>,
    next_rotation_height: u64,
}

impl CommitteeSchedule {
    /// Build the pool and draw the first committee.
    pub fn new(rng: &mut DeterministicRng) -> Self {
        let pool: Vec<CommitteeId> = (0..COMMITTEE_POOL_SIZE).map(CommitteeId::from_index).collect();
        let mut schedule = Self {
            pool,
            active: Vec::new(),
            next_rotation_height: 0,
        };
        schedule.rotate(rng, 0);
        schedule
    }

    /// Rotate when `height` is a rotation boundary. Returns whether it did.
    pub fn maybe_rotate(&mut self, rng: &mut DeterministicRng, height: u64) -> bool {
        if height % ROTATION_INTERVAL != 0 {
            return false;
        }
        self.rotate(rng, height);
        true
    }

    fn rotate(&mut self, rng: &mut DeterministicRng, height: u64) {
        rng.shuffle(&mut self.pool);
        self.active = self.pool.iter().take(COMMITTEE_SIZE).cloned().collect();
        self.next_rotation_height = height + ROTATION_INTERVAL;
    }

    pub fn active(&self) -> &[CommitteeId] {
        &self.active
    }

    pub fn next_rotation_height(&self) -> u64 {
        self.next_rotation_height
    }

    /// Milliseconds until the next rotation, assuming one block per interval.
    pub fn time_to_next_election_ms(&self, current_height: u64, block_interval_ms: u64) -> u64 {
        self.next_rotation_height
            .saturating_sub(current_height)
            .saturating_mul(block_interval_ms)
    }
}
