//! Rotation engine: pure remapping of a court along the serving-order cycle.

use crate::models::{CourtSide, CourtState, RotationDirection, RotationSlot};

/// Rotate a court one position. Forward moves every occupant to the next
/// slot in the serving-order cycle (1→6→5→4→3→2→1); backward is the exact
/// inverse. Total: always yields a full remapping of all six slots,
/// occupants and empties alike.
pub fn rotated(court: &CourtState, direction: RotationDirection) -> CourtState {
    let mut next = CourtState::new();
    for slot in RotationSlot::ALL {
        if let Some(id) = court.occupant(slot) {
            let target = match direction {
                RotationDirection::Forward => slot.next_in_cycle(),
                RotationDirection::Backward => slot.prev_in_cycle(),
            };
            next.assign(target, id);
        }
    }
    next
}

/// Rotate as experienced visually by a team displayed on `side`: a team on
/// the right half of the screen rotates the opposite abstract direction for
/// the same gesture.
pub fn rotated_visual(
    court: &CourtState,
    direction: RotationDirection,
    side: CourtSide,
) -> CourtState {
    rotated(court, direction.for_side(side))
}

/// The slot a tracked occupant of `slot` ends up in after the court rotates
pub fn slot_after_rotation(slot: RotationSlot, direction: RotationDirection) -> RotationSlot {
    match direction {
        RotationDirection::Forward => slot.next_in_cycle(),
        RotationDirection::Backward => slot.prev_in_cycle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_court() -> CourtState {
        let mut court = CourtState::new();
        for slot in RotationSlot::ALL {
            court.assign(slot, format!("p{}", slot.number()));
        }
        court
    }

    #[test]
    fn test_forward_moves_server_into_slot_one() {
        let court = full_court();
        let next = rotated(&court, RotationDirection::Forward);
        // Occupant of 2 becomes the next server in 1; occupant of 1 drops to 6
        assert_eq!(next.occupant(RotationSlot::S1), Some("p2"));
        assert_eq!(next.occupant(RotationSlot::S6), Some("p1"));
        assert_eq!(next.occupant(RotationSlot::S4), Some("p5"));
    }

    #[test]
    fn test_six_forward_rotations_are_identity() {
        let court = full_court();
        let mut rotated_court = court.clone();
        for _ in 0..6 {
            rotated_court = rotated(&rotated_court, RotationDirection::Forward);
        }
        assert_eq!(rotated_court, court);

        let mut backward = court.clone();
        for _ in 0..6 {
            backward = rotated(&backward, RotationDirection::Backward);
        }
        assert_eq!(backward, court);
    }

    #[test]
    fn test_rotation_preserves_empties() {
        let mut court = CourtState::new();
        court.assign(RotationSlot::S3, "solo");
        let next = rotated(&court, RotationDirection::Forward);
        assert_eq!(next.occupant(RotationSlot::S2), Some("solo"));
        assert_eq!(next.occupied_ids().len(), 1);
    }

    #[test]
    fn test_visual_rotation_flips_on_right_side() {
        let court = full_court();
        let left = rotated_visual(&court, RotationDirection::Forward, CourtSide::Left);
        let right = rotated_visual(&court, RotationDirection::Forward, CourtSide::Right);
        assert_eq!(left, rotated(&court, RotationDirection::Forward));
        assert_eq!(right, rotated(&court, RotationDirection::Backward));
    }

    fn arb_court() -> impl Strategy<Value = CourtState> {
        proptest::collection::vec(proptest::option::of(0u8..12), 6).prop_map(|ids| {
            let mut court = CourtState::new();
            let mut used = Vec::new();
            for (slot, id) in RotationSlot::ALL.into_iter().zip(ids) {
                if let Some(id) = id {
                    if !used.contains(&id) {
                        used.push(id);
                        court.assign(slot, format!("p{}", id));
                    }
                }
            }
            court
        })
    }

    proptest! {
        #[test]
        fn prop_forward_then_backward_is_identity(court in arb_court()) {
            let round_trip =
                rotated(&rotated(&court, RotationDirection::Forward), RotationDirection::Backward);
            prop_assert_eq!(round_trip, court);
        }

        #[test]
        fn prop_rotation_preserves_occupant_set(court in arb_court()) {
            let mut before = court.occupied_ids();
            let mut after = rotated(&court, RotationDirection::Forward).occupied_ids();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
