//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Randomness only through an injected `rand::Rng` (a seeded `Pcg32` per session)
//! - Rate-based changes scaled by the frame scale factor
//! - No rendering, audio or physics dependencies

pub mod collision;
pub mod entities;
pub mod events;
pub mod ledger;
pub mod placement;
pub mod progression;
pub mod stage;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Rect, coin_hit, over_trap, player_box, spike_hit};
pub use entities::{Coin, Door, DoorState, DoorTransition, Obstacle, ObstacleKind, Shop, SpikeTooth};
pub use events::{GameEvent, SoundCue};
pub use ledger::{Items, Ledger, LedgerSnapshot, PurchaseRejection, ShopItem};
pub use placement::{KindAllocator, PlacementError, create_safe_obstacle, is_overlapping};
pub use progression::{obstacle_count, obstacle_spacing, stage_length, stage_length_px};
pub use stage::{Stage, StageReport, build_stage};
pub use state::{GamePhase, GameSession, HudSnapshot, Notice, Odometer};
pub use tick::{FrameTime, PlayerSnapshot, TickInput, tick};
pub use timers::{Deferred, TimedEffect};
