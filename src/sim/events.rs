//! Events emitted for the rendering, audio and UI layers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ledger::{PurchaseRejection, ShopItem};

/// Something the outside world may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { total: u32 },
    PurchaseSucceeded { item: ShopItem },
    PurchaseFailed { reason: PurchaseRejection },
    ShopOpened,
    ShopClosed,
    DoorOpening,
    DoorOpened,
    /// Stage `stage` was cleared; the next one is being prepared
    StageCleared { stage: u32 },
    /// Stage `stage` was built and is playable
    StageStarted { stage: u32 },
    /// A spike took a heart
    HeartLost { remaining: u8 },
    /// The player dropped into a trap
    TrapTriggered,
    GameOver { score: u64, stage: u32 },
    /// The player must be moved to `pos` with zero velocity
    PlayerReset { pos: Vec2 },
}

/// Sound the audio layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Coin,
    Purchase,
    Denied,
    Door,
    StageClear,
    Hurt,
    Fall,
    GameOver,
}

impl GameEvent {
    /// Sound for this event, if any
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::CoinCollected { .. } => Some(SoundCue::Coin),
            GameEvent::PurchaseSucceeded { .. } => Some(SoundCue::Purchase),
            GameEvent::PurchaseFailed { .. } => Some(SoundCue::Denied),
            GameEvent::DoorOpening => Some(SoundCue::Door),
            GameEvent::StageCleared { .. } => Some(SoundCue::StageClear),
            GameEvent::HeartLost { .. } => Some(SoundCue::Hurt),
            GameEvent::TrapTriggered => Some(SoundCue::Fall),
            GameEvent::GameOver { .. } => Some(SoundCue::GameOver),
            GameEvent::ShopOpened
            | GameEvent::ShopClosed
            | GameEvent::DoorOpened
            | GameEvent::StageStarted { .. }
            | GameEvent::PlayerReset { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_cues() {
        assert_eq!(
            GameEvent::CoinCollected { total: 1 }.sound_cue(),
            Some(SoundCue::Coin)
        );
        assert_eq!(
            GameEvent::PurchaseFailed {
                reason: PurchaseRejection::AlreadyMaxHearts
            }
            .sound_cue(),
            Some(SoundCue::Denied)
        );
        assert_eq!(GameEvent::StageStarted { stage: 2 }.sound_cue(), None);
    }
}
