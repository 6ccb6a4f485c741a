//! Skills and outcomes.
//!
//! Raw UI labels ("ACE", "KILL", "RECEPTION ERROR", ...) are parsed exactly
//! once at the boundary via [`Skill::from_str`] and [`Outcome::parse`]. The
//! engine only ever works with the tagged variants below; nothing downstream
//! re-inspects strings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::player::TeamId;

/// One rally contact type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Serve,
    Receive,
    Set,
    Attack,
    Block,
    Dig,
}

impl Skill {
    pub const ALL: [Skill; 6] =
        [Skill::Serve, Skill::Receive, Skill::Set, Skill::Attack, Skill::Block, Skill::Dig];
}

impl FromStr for Skill {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "SERVE" | "SERVICE" => Ok(Skill::Serve),
            "RECEIVE" | "RECEPTION" | "PASS" => Ok(Skill::Receive),
            "SET" => Ok(Skill::Set),
            "ATTACK" | "SPIKE" | "HIT" => Ok(Skill::Attack),
            "BLOCK" => Ok(Skill::Block),
            "DIG" | "DEFENSE" => Ok(Skill::Dig),
            _ => Err(LabelParseError::UnknownSkill(s.to_string())),
        }
    }
}

/// Broad outcome classification driving point attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    /// Point-winning contact (ace, kill, stuff block)
    Win,
    /// Fault by the acting player; point goes to the opponent
    Error,
    /// Rally continues (or action is handed over first)
    Neutral,
}

/// Skill-qualified outcome of one logged contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    // serve
    Ace,
    /// Point won on serve but charged as a reception fault: action passes to
    /// the opponent so the shanked reception can be logged.
    AceOnOpponentError,
    ServiceError,
    ServeInPlay,

    // reception
    PerfectPass,
    GoodPass,
    /// Ball played straight over; possession changes without ending the rally
    Overpass,
    ReceptionError,

    // set
    SetInPlay,
    SetError,

    // attack
    Kill,
    /// Attack forced an opponent touch fault (e.g. blocker netted): action
    /// passes to the opponent so their error can be logged.
    AttackOnOpponentError,
    AttackError,
    /// Attack kept in play by the defense
    AttackDefended,

    // block
    StuffBlock,
    BlockTouch,
    BlockError,

    // dig
    DigInPlay,
    DigError,
}

impl Outcome {
    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Ace | Outcome::Kill | Outcome::StuffBlock => OutcomeClass::Win,
            Outcome::ServiceError
            | Outcome::ReceptionError
            | Outcome::SetError
            | Outcome::AttackError
            | Outcome::BlockError
            | Outcome::DigError => OutcomeClass::Error,
            Outcome::AceOnOpponentError
            | Outcome::ServeInPlay
            | Outcome::PerfectPass
            | Outcome::GoodPass
            | Outcome::Overpass
            | Outcome::SetInPlay
            | Outcome::AttackOnOpponentError
            | Outcome::AttackDefended
            | Outcome::BlockTouch
            | Outcome::DigInPlay => OutcomeClass::Neutral,
        }
    }

    /// Whether this contact decides the rally.
    ///
    /// Hand-over outcomes (`AceOnOpponentError`, `AttackOnOpponentError`) do
    /// not end the rally themselves; the follow-up fault event does.
    pub fn ends_rally(&self) -> bool {
        self.class() != OutcomeClass::Neutral
    }

    /// Point attribution for a contact by `acting` with `skill`.
    ///
    /// Errors always score for the opponent. Win-class outcomes score for the
    /// acting team only on serve, attack and block; digs, sets and receptions
    /// never directly win a point.
    pub fn awards_point(&self, skill: Skill, acting: TeamId) -> Option<TeamId> {
        match self.class() {
            OutcomeClass::Error => Some(acting.opponent()),
            OutcomeClass::Win => match skill {
                Skill::Serve | Skill::Attack | Skill::Block => Some(acting),
                _ => None,
            },
            OutcomeClass::Neutral => None,
        }
    }

    /// The skill this outcome qualifies
    pub fn skill(&self) -> Skill {
        match self {
            Outcome::Ace
            | Outcome::AceOnOpponentError
            | Outcome::ServiceError
            | Outcome::ServeInPlay => Skill::Serve,
            Outcome::PerfectPass
            | Outcome::GoodPass
            | Outcome::Overpass
            | Outcome::ReceptionError => Skill::Receive,
            Outcome::SetInPlay | Outcome::SetError => Skill::Set,
            Outcome::Kill
            | Outcome::AttackOnOpponentError
            | Outcome::AttackError
            | Outcome::AttackDefended => Skill::Attack,
            Outcome::StuffBlock | Outcome::BlockTouch | Outcome::BlockError => Skill::Block,
            Outcome::DigInPlay | Outcome::DigError => Skill::Dig,
        }
    }

    pub fn valid_for(&self, skill: Skill) -> bool {
        self.skill() == skill
    }

    /// Parse a raw outcome label in the context of its skill.
    ///
    /// Exact variant names are accepted first; otherwise legacy labels fall
    /// back to the historical keyword rule (ACE / KILL / POINT win, ERROR /
    /// OUT / NET fault, anything else in play). The fallback exists only
    /// here, at the boundary.
    pub fn parse(skill: Skill, label: &str) -> Result<Outcome, LabelParseError> {
        let norm = normalize(label);
        let exact = match norm.as_str() {
            "ACE" => Some(Outcome::Ace),
            "ACE_ON_OPPONENT_ERROR" | "ACE_ON_ERROR" => Some(Outcome::AceOnOpponentError),
            "SERVICE_ERROR" | "SERVE_ERROR" => Some(Outcome::ServiceError),
            "SERVE_IN_PLAY" | "IN_PLAY_SERVE" => Some(Outcome::ServeInPlay),
            "PERFECT_PASS" | "PERFECT" | "EXCELLENT" => Some(Outcome::PerfectPass),
            "GOOD_PASS" | "GOOD" | "POSITIVE" => Some(Outcome::GoodPass),
            "OVERPASS" | "OVER_PASS" => Some(Outcome::Overpass),
            "RECEPTION_ERROR" | "SHANK" => Some(Outcome::ReceptionError),
            "SET_IN_PLAY" | "ASSIST" => Some(Outcome::SetInPlay),
            "SET_ERROR" | "DOUBLE_CONTACT" => Some(Outcome::SetError),
            "KILL" => Some(Outcome::Kill),
            "ATTACK_ON_OPPONENT_ERROR" | "TOOL" | "BLOCK_OUT" => {
                Some(Outcome::AttackOnOpponentError)
            }
            "ATTACK_ERROR" | "HITTING_ERROR" => Some(Outcome::AttackError),
            "ATTACK_DEFENDED" | "DEFENDED" | "DUG" => Some(Outcome::AttackDefended),
            "STUFF_BLOCK" | "STUFF" | "BLOCK_POINT" => Some(Outcome::StuffBlock),
            "BLOCK_TOUCH" | "TOUCH" => Some(Outcome::BlockTouch),
            "BLOCK_ERROR" => Some(Outcome::BlockError),
            "DIG_IN_PLAY" | "UP" => Some(Outcome::DigInPlay),
            "DIG_ERROR" => Some(Outcome::DigError),
            _ => None,
        };

        if let Some(outcome) = exact {
            if outcome.valid_for(skill) {
                return Ok(outcome);
            }
            return Err(LabelParseError::OutcomeSkillMismatch {
                outcome: norm,
                skill,
            });
        }

        // Legacy keyword fallback
        if norm.contains("ACE") {
            return if skill == Skill::Serve {
                Ok(Outcome::Ace)
            } else {
                Err(LabelParseError::OutcomeSkillMismatch { outcome: norm, skill })
            };
        }
        if norm.contains("KILL") || norm.contains("POINT") {
            return match skill {
                Skill::Serve => Ok(Outcome::Ace),
                Skill::Attack => Ok(Outcome::Kill),
                Skill::Block => Ok(Outcome::StuffBlock),
                _ => Err(LabelParseError::OutcomeSkillMismatch { outcome: norm, skill }),
            };
        }
        if norm.contains("ERROR") || norm.contains("OUT") || norm.contains("NET") {
            return Ok(match skill {
                Skill::Serve => Outcome::ServiceError,
                Skill::Receive => Outcome::ReceptionError,
                Skill::Set => Outcome::SetError,
                Skill::Attack => Outcome::AttackError,
                Skill::Block => Outcome::BlockError,
                Skill::Dig => Outcome::DigError,
            });
        }
        if norm.is_empty() {
            return Err(LabelParseError::UnknownOutcome(label.to_string()));
        }

        // Unrecognized but non-terminal label: treat as the skill's in-play outcome
        Ok(match skill {
            Skill::Serve => Outcome::ServeInPlay,
            Skill::Receive => Outcome::GoodPass,
            Skill::Set => Outcome::SetInPlay,
            Skill::Attack => Outcome::AttackDefended,
            Skill::Block => Outcome::BlockTouch,
            Skill::Dig => Outcome::DigInPlay,
        })
    }
}

/// Boundary label parse failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    UnknownSkill(String),
    UnknownOutcome(String),
    OutcomeSkillMismatch { outcome: String, skill: Skill },
}

impl std::fmt::Display for LabelParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelParseError::UnknownSkill(s) => write!(f, "Unknown skill label: {}", s),
            LabelParseError::UnknownOutcome(s) => write!(f, "Unknown outcome label: {}", s),
            LabelParseError::OutcomeSkillMismatch { outcome, skill } => {
                write!(f, "Outcome {} is not valid for skill {:?}", outcome, skill)
            }
        }
    }
}

impl std::error::Error for LabelParseError {}

fn normalize(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}
