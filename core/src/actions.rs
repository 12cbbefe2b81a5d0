//! Enforcement action buttons shown when actions are enabled in the
//! console configuration.

use crate::model::PlayerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Permaban,
    RemovePermaban,
    TimeBan,
    RemoveTimeBan,
}

impl PlayerAction {
    pub fn label(self) -> &'static str {
        match self {
            PlayerAction::Permaban => "Permaban User",
            PlayerAction::RemovePermaban => "Remove Permaban",
            PlayerAction::TimeBan => "Time Ban User",
            PlayerAction::RemoveTimeBan => "Remove Timeban",
        }
    }

    pub fn is_permanent(self) -> bool {
        matches!(self, PlayerAction::Permaban | PlayerAction::RemovePermaban)
    }
}

/// The permanent-ban control followed by the temporary-ban control.
pub fn player_actions(record: &PlayerRecord) -> [PlayerAction; 2] {
    let permanent = if record.is_permabanned {
        PlayerAction::RemovePermaban
    } else {
        PlayerAction::Permaban
    };
    let temporary = if record.is_time_banned {
        PlayerAction::RemoveTimeBan
    } else {
        PlayerAction::TimeBan
    };
    [permanent, temporary]
}
