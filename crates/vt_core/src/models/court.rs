//! Court formation: rotation slots and per-team slot assignments.

use serde::{Deserialize, Serialize};

/// One of the six rotation positions, numbered per standard volleyball
/// labeling. Slots 2/3/4 are the front row, 1/5/6 the back row; this
/// partition drives block and libero eligibility and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum RotationSlot {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
}

impl RotationSlot {
    pub const ALL: [RotationSlot; 6] = [
        RotationSlot::S1,
        RotationSlot::S2,
        RotationSlot::S3,
        RotationSlot::S4,
        RotationSlot::S5,
        RotationSlot::S6,
    ];

    /// Serving-order cycle: 1 → 6 → 5 → 4 → 3 → 2 → back to 1.
    pub const SERVING_ORDER: [RotationSlot; 6] = [
        RotationSlot::S1,
        RotationSlot::S6,
        RotationSlot::S5,
        RotationSlot::S4,
        RotationSlot::S3,
        RotationSlot::S2,
    ];

    pub fn number(&self) -> u8 {
        match self {
            RotationSlot::S1 => 1,
            RotationSlot::S2 => 2,
            RotationSlot::S3 => 3,
            RotationSlot::S4 => 4,
            RotationSlot::S5 => 5,
            RotationSlot::S6 => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        RotationSlot::ALL.get(n.checked_sub(1)? as usize).copied()
    }

    pub fn is_front_row(&self) -> bool {
        matches!(self, RotationSlot::S2 | RotationSlot::S3 | RotationSlot::S4)
    }

    pub fn is_back_row(&self) -> bool {
        !self.is_front_row()
    }

    pub(crate) fn index(&self) -> usize {
        self.number() as usize - 1
    }

    /// Next slot along the serving-order cycle (the slot a forward-rotating
    /// occupant of `self` lands in).
    pub fn next_in_cycle(&self) -> Self {
        let pos = Self::SERVING_ORDER.iter().position(|s| s == self).unwrap_or(0);
        Self::SERVING_ORDER[(pos + 1) % 6]
    }

    /// Inverse of [`next_in_cycle`](Self::next_in_cycle)
    pub fn prev_in_cycle(&self) -> Self {
        let pos = Self::SERVING_ORDER.iter().position(|s| s == self).unwrap_or(0);
        Self::SERVING_ORDER[(pos + 5) % 6]
    }
}

/// Which side of center a team is currently displayed on.
///
/// Rotation buttons in the UI are visual; a team shown on the right side
/// rotates in the opposite abstract direction for the same button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourtSide {
    #[default]
    Left,
    Right,
}

/// Abstract rotation direction along the serving-order cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Forward,
    Backward,
}

impl RotationDirection {
    pub fn reversed(&self) -> Self {
        match self {
            RotationDirection::Forward => RotationDirection::Backward,
            RotationDirection::Backward => RotationDirection::Forward,
        }
    }

    /// Compose a visual direction with the side the team is displayed on
    pub fn for_side(self, side: CourtSide) -> Self {
        match side {
            CourtSide::Left => self,
            CourtSide::Right => self.reversed(),
        }
    }
}

/// Slot-to-player mapping for one team's half of the court.
///
/// Invariant: a player id appears in at most one slot. Slots may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CourtState {
    slots: [Option<String>; 6],
}

impl CourtState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, slot: RotationSlot) -> Option<&str> {
        self.slots[slot.index()].as_deref()
    }

    /// Find the slot a player currently occupies
    pub fn slot_of(&self, player_id: &str) -> Option<RotationSlot> {
        RotationSlot::ALL
            .into_iter()
            .find(|slot| self.occupant(*slot) == Some(player_id))
    }

    /// Assign a player to a slot. A player already on court is moved: their
    /// previous slot is cleared first, preserving the one-slot invariant.
    pub fn assign(&mut self, slot: RotationSlot, player_id: impl Into<String>) {
        let player_id = player_id.into();
        if let Some(previous) = self.slot_of(&player_id) {
            if previous == slot {
                return;
            }
            self.slots[previous.index()] = None;
        }
        self.slots[slot.index()] = Some(player_id);
    }

    pub fn clear(&mut self, slot: RotationSlot) -> Option<String> {
        self.slots[slot.index()].take()
    }

    pub fn swap(&mut self, a: RotationSlot, b: RotationSlot) {
        self.slots.swap(a.index(), b.index());
    }

    /// Remove a player wherever they stand
    pub fn remove_player(&mut self, player_id: &str) {
        if let Some(slot) = self.slot_of(player_id) {
            self.slots[slot.index()] = None;
        }
    }

    pub fn occupied_ids(&self) -> Vec<String> {
        RotationSlot::ALL
            .into_iter()
            .filter_map(|slot| self.occupant(slot).map(str::to_string))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear_all(&mut self) {
        self.slots = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_front_back_partition() {
        let front: Vec<u8> = RotationSlot::iter()
            .filter(RotationSlot::is_front_row)
            .map(|s| s.number())
            .collect();
        assert_eq!(front, vec![2, 3, 4]);
        let back: Vec<u8> = RotationSlot::iter()
            .filter(RotationSlot::is_back_row)
            .map(|s| s.number())
            .collect();
        assert_eq!(back, vec![1, 5, 6]);
    }

    #[test]
    fn test_cycle_is_a_single_orbit() {
        let mut slot = RotationSlot::S1;
        let mut seen = vec![slot];
        for _ in 0..5 {
            slot = slot.next_in_cycle();
            assert!(!seen.contains(&slot));
            seen.push(slot);
        }
        assert_eq!(slot.next_in_cycle(), RotationSlot::S1);
    }

    #[test]
    fn test_prev_inverts_next() {
        for slot in RotationSlot::ALL {
            assert_eq!(slot.next_in_cycle().prev_in_cycle(), slot);
        }
    }

    #[test]
    fn test_assign_moves_player_between_slots() {
        let mut court = CourtState::new();
        court.assign(RotationSlot::S1, "p1");
        court.assign(RotationSlot::S4, "p1");
        assert_eq!(court.occupant(RotationSlot::S1), None);
        assert_eq!(court.occupant(RotationSlot::S4), Some("p1"));
        assert_eq!(court.occupied_ids().len(), 1);
    }

    #[test]
    fn test_side_flip_reverses_direction() {
        assert_eq!(
            RotationDirection::Forward.for_side(CourtSide::Right),
            RotationDirection::Backward
        );
        assert_eq!(
            RotationDirection::Forward.for_side(CourtSide::Left),
            RotationDirection::Forward
        );
    }

    #[test]
    fn test_slot_numbers_roundtrip() {
        for slot in RotationSlot::ALL {
            assert_eq!(RotationSlot::from_number(slot.number()), Some(slot));
        }
        assert_eq!(RotationSlot::from_number(0), None);
        assert_eq!(RotationSlot::from_number(7), None);
    }
}
