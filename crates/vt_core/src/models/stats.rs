//! Statistic value types; the aggregation logic lives in `engine::stats`.

use serde::{Deserialize, Serialize};

/// Per-player counting stats over one set or a whole match.
///
/// Attack and block count decided points, not attempts; serve counts aces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerStatLine {
    pub serves: u32,
    pub receptions: u32,
    pub reception_faults: u32,
    pub digs: u32,
    pub dig_faults: u32,
    pub attacks: u32,
    pub blocks: u32,
    pub sets: u32,
    pub set_faults: u32,

    /// Role-weighted player-of-the-game score
    pub rating: f32,
}

impl PlayerStatLine {
    pub fn merge(&mut self, other: &PlayerStatLine) {
        self.serves += other.serves;
        self.receptions += other.receptions;
        self.reception_faults += other.reception_faults;
        self.digs += other.digs;
        self.dig_faults += other.dig_faults;
        self.attacks += other.attacks;
        self.blocks += other.blocks;
        self.sets += other.sets;
        self.set_faults += other.set_faults;
        // Rating is recomputed from the merged counts by the aggregator
    }
}

/// Per-team point rollup derived from point attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TeamTotals {
    pub kills: u32,
    pub aces: u32,
    pub block_points: u32,
    pub errors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_counts() {
        let mut a = PlayerStatLine { attacks: 3, digs: 1, ..Default::default() };
        let b = PlayerStatLine { attacks: 2, set_faults: 1, ..Default::default() };
        a.merge(&b);
        assert_eq!(a.attacks, 5);
        assert_eq!(a.digs, 1);
        assert_eq!(a.set_faults, 1);
    }
}
