//! Domain model: rosters, courts, skills, events and match configuration.

pub mod court;
pub mod events;
pub mod libero;
pub mod player;
pub mod rules;
pub mod set_record;
pub mod skill;
pub mod stats;

pub use court::{CourtSide, CourtState, RotationDirection, RotationSlot};
pub use events::{ActionEvent, StateSnapshot};
pub use libero::{LiberoConfig, LiberoSwap};
pub use player::{Player, Position, RoleBucket, TeamId};
pub use rules::SetRules;
pub use set_record::SetRecord;
pub use skill::{LabelParseError, Outcome, OutcomeClass, Skill};
pub use stats::{PlayerStatLine, TeamTotals};
