//! Roster entities: teams, positions and players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Team identifier (neutral representation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    /// Get opponent team
    pub fn opponent(&self) -> Self {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::A => write!(f, "A"),
            TeamId::B => write!(f, "B"),
        }
    }
}

/// On-court role of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    OutsideHitter,
    Opposite,
    MiddleBlocker,
    Setter,
    Libero,
}

impl Position {
    /// Bucket used by the rating weight table and leaderboards.
    ///
    /// Outside hitters and opposites share one bucket: their scoring
    /// profile (serve / attack / reception) is weighted identically.
    pub fn role_bucket(&self) -> RoleBucket {
        match self {
            Position::OutsideHitter | Position::Opposite => RoleBucket::Winger,
            Position::MiddleBlocker => RoleBucket::MiddleBlocker,
            Position::Setter => RoleBucket::Setter,
            Position::Libero => RoleBucket::Libero,
        }
    }
}

/// Weighting bucket for the player-of-the-game rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleBucket {
    Winger,
    MiddleBlocker,
    Setter,
    Libero,
}

impl RoleBucket {
    pub const ALL: [RoleBucket; 4] = [
        RoleBucket::Winger,
        RoleBucket::MiddleBlocker,
        RoleBucket::Setter,
        RoleBucket::Libero,
    ];
}

/// A rostered player.
///
/// `id` is minted once at creation and never changes; every other field is
/// editable through roster updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub team: TeamId,
    pub name: String,
    pub number: u8,
    pub position: Position,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(team: TeamId, name: impl Into<String>, number: u8, position: Position) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            team,
            name: name.into(),
            number,
            position,
            created_at: Utc::now(),
        }
    }

    pub fn is_libero(&self) -> bool {
        self.position == Position::Libero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involutive() {
        assert_eq!(TeamId::A.opponent(), TeamId::B);
        assert_eq!(TeamId::B.opponent().opponent(), TeamId::B);
    }

    #[test]
    fn test_role_buckets() {
        assert_eq!(Position::OutsideHitter.role_bucket(), RoleBucket::Winger);
        assert_eq!(Position::Opposite.role_bucket(), RoleBucket::Winger);
        assert_eq!(Position::MiddleBlocker.role_bucket(), RoleBucket::MiddleBlocker);
        assert_eq!(Position::Libero.role_bucket(), RoleBucket::Libero);
        assert_eq!(Position::Setter.role_bucket(), RoleBucket::Setter);
    }

    #[test]
    fn test_player_ids_are_unique() {
        let a = Player::new(TeamId::A, "Kim", 7, Position::Setter);
        let b = Player::new(TeamId::A, "Kim", 7, Position::Setter);
        assert_ne!(a.id, b.id);
    }
}
