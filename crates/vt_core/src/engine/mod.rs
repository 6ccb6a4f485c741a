//! Rules engine: pure functions over the domain model plus the transition
//! methods on [`crate::state::MatchState`].

pub mod advisory;
pub mod libero;
pub mod rally;
pub mod rotation;
pub mod scoring;
pub mod stats;

pub use advisory::{Advisory, Severity};
pub use libero::{run_libero_pass, LiberoPassResult};
pub use rally::{next_rally_state, validate_action, RallyState};
pub use rotation::{rotated, rotated_visual, slot_after_rotation};
pub use stats::{compute_stats, leaderboard, match_stats, team_totals, LeaderboardEntry};
