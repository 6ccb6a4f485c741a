//! Match format configuration.

use serde::{Deserialize, Serialize};

use super::player::TeamId;

/// Rules governing set and match progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRules {
    /// Best-of-N sets (odd)
    pub best_of: u8,

    /// Points needed to win a regular set
    pub points_regular: u16,

    /// Points needed to win the deciding set
    pub points_deciding: u16,

    /// Minimum winning margin
    pub win_by: u16,

    /// Clear both courts (and swap records) when a set ends
    #[serde(default)]
    pub reset_courts_between_sets: bool,
}

impl Default for SetRules {
    fn default() -> Self {
        Self {
            best_of: 5,
            points_regular: 25,
            points_deciding: 15,
            win_by: 2,
            reset_courts_between_sets: false,
        }
    }
}

impl SetRules {
    /// Sets a team must win to take the match
    pub fn sets_to_win(&self) -> u8 {
        self.best_of / 2 + 1
    }

    /// The deciding-set threshold applies only when both teams stand one set
    /// short of the match.
    pub fn is_deciding_set(&self, sets_won_a: u8, sets_won_b: u8) -> bool {
        let penultimate = self.sets_to_win().saturating_sub(1);
        sets_won_a == penultimate && sets_won_b == penultimate
    }

    /// Points threshold for the current set
    pub fn points_to_win(&self, sets_won_a: u8, sets_won_b: u8) -> u16 {
        if self.is_deciding_set(sets_won_a, sets_won_b) {
            self.points_deciding
        } else {
            self.points_regular
        }
    }

    /// Winner of a set at the given score, if any. No upper score bound:
    /// play continues until threshold and margin are both met.
    pub fn set_winner(
        &self,
        score_a: u16,
        score_b: u16,
        sets_won_a: u8,
        sets_won_b: u8,
    ) -> Option<TeamId> {
        let threshold = self.points_to_win(sets_won_a, sets_won_b);
        let (leader, lead, trail) = if score_a >= score_b {
            (TeamId::A, score_a, score_b)
        } else {
            (TeamId::B, score_b, score_a)
        };
        if lead >= threshold && lead - trail >= self.win_by {
            Some(leader)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deciding_set_detection() {
        let rules = SetRules::default(); // best of 5
        assert!(!rules.is_deciding_set(0, 0));
        assert!(!rules.is_deciding_set(2, 1));
        assert!(rules.is_deciding_set(2, 2));

        let bo3 = SetRules { best_of: 3, ..SetRules::default() };
        assert!(bo3.is_deciding_set(1, 1));
        assert!(!bo3.is_deciding_set(1, 0));
    }

    #[test]
    fn test_regular_set_winner_needs_margin() {
        let rules = SetRules { best_of: 3, points_regular: 25, win_by: 2, ..SetRules::default() };
        assert_eq!(rules.set_winner(25, 23, 0, 0), Some(TeamId::A));
        assert_eq!(rules.set_winner(25, 24, 0, 0), None);
        assert_eq!(rules.set_winner(25, 20, 0, 0), Some(TeamId::A));
        assert_eq!(rules.set_winner(24, 26, 0, 0), Some(TeamId::B));
        assert_eq!(rules.set_winner(30, 29, 0, 0), None);
        assert_eq!(rules.set_winner(31, 29, 0, 0), Some(TeamId::A));
    }

    #[test]
    fn test_deciding_set_uses_lower_threshold() {
        let rules = SetRules::default();
        assert_eq!(rules.set_winner(15, 10, 2, 2), Some(TeamId::A));
        assert_eq!(rules.set_winner(15, 10, 2, 1), None);
        assert_eq!(rules.set_winner(15, 14, 2, 2), None);
    }
}
