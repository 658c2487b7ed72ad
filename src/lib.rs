//! Stage Runner - stage generation and progression for a side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Stage layout, ledger, lifecycle state machine and per-frame update
//! - `settings`: Session configuration
//! - `records`: In-memory run leaderboard
//!
//! Rendering, input wiring, audio playback and player physics live outside
//! this crate; they talk to it through `sim::TickInput`, `sim::PlayerSnapshot`,
//! `sim::GameEvent` and `sim::HudSnapshot`.

pub mod records;
pub mod settings;
pub mod sim;

pub use records::RunRecords;
pub use settings::{Settings, TargetFps};

/// Game configuration constants
pub mod consts {
    /// One distance unit ("meter") in world position units
    pub const PIXELS_PER_METER: f32 = 240.0;
    /// Reference frame duration the frame scale factor is measured against
    pub const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;

    /// Default ground line (two thirds of a 720px tall view)
    pub const DEFAULT_GROUND_Y: f32 = 480.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 64.0;
    /// Safe respawn x after a restart or invalid state
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    /// Base horizontal speed per reference frame
    pub const PLAYER_BASE_SPEED: f32 = 4.0;

    /// Minimum horizontal separation between two obstacles
    pub const OBSTACLE_MIN_SEPARATION: f32 = 150.0;
    /// Conservative half-width used for every obstacle in shop/door checks
    pub const OBSTACLE_APPROX_HALF_WIDTH: f32 = 45.0;
    /// Extra clearance between an obstacle footprint and the shop/door
    pub const OBSTACLE_MARGIN: f32 = 50.0;
    /// Extra clearance between a coin and the shop/door
    pub const COIN_MARGIN: f32 = 30.0;
    /// Nothing is placed within this distance before the door
    pub const DOOR_CLEAR_ZONE: f32 = PIXELS_PER_METER;
    /// Nudge attempts when a candidate obstacle overlaps another
    pub const OBSTACLE_NUDGE_ATTEMPTS: u32 = 10;
    /// Extra random attempts within a section after the first one fails
    pub const SECTION_RETRIES: u32 = 5;

    /// Layout offsets from the stage origin
    pub const SHOP_OFFSET: f32 = 200.0;
    pub const OBSTACLE_BAND_OFFSET: f32 = 500.0;
    pub const COIN_START_OFFSET: f32 = 350.0;

    /// Coin placement
    pub const COIN_STRIDE_MIN: f32 = 200.0;
    pub const COIN_STRIDE_MAX: f32 = 300.0;
    pub const COIN_JITTER: f32 = 200.0;
    /// Coins this close to an obstacle sit at jump height
    pub const COIN_OBSTACLE_RADIUS: f32 = 150.0;
    pub const COIN_GROUND_LIFT: f32 = 60.0;
    pub const COIN_APEX_LIFT: f32 = 100.0;
    pub const COIN_SIZE: f32 = 20.0;

    /// Shop and door footprints
    pub const SHOP_WIDTH: f32 = 96.0;
    pub const SHOP_HEIGHT: f32 = 115.0;
    pub const DOOR_WIDTH: f32 = 80.0;
    pub const DOOR_HEIGHT: f32 = 120.0;

    /// Door starts opening when the player is this close
    pub const DOOR_TRIGGER_DISTANCE: f32 = 100.0;
    /// Door opening progress per reference frame (fraction of full height)
    pub const DOOR_OPEN_RATE: f32 = 0.03;
    /// Shop prompt radius
    pub const SHOP_PROXIMITY: f32 = 70.0;

    /// Wall-clock delay between clearing a stage and building the next
    pub const STAGE_ADVANCE_DELAY_SECS: f64 = 1.0;
    /// Purchase rejection notice duration
    pub const NOTICE_SECS: f32 = 3.0;
    /// Invulnerability after a spike hit
    pub const INVINCIBLE_SECS: f32 = 1.0;
    /// Red damage flash after a spike hit
    pub const DAMAGE_FLASH_SECS: f32 = 0.5;
    /// Time spent falling into a trap before the run ends
    pub const TRAP_FALL_SECS: f32 = 2.0;

    /// Ledger defaults
    pub const STARTING_HEARTS: u8 = 3;
    pub const MAX_HEARTS: u8 = 7;
    pub const MAX_SHOE_TIER: u8 = 4;

    /// Objects further than this behind the stage start are swept
    pub const CLEANUP_BEHIND_START: f32 = 200.0;
    /// The player may not walk further back than this behind the stage start
    pub const BACKTRACK_ALLOWANCE: f32 = 50.0;
}

/// Convert a distance in meters to world units
#[inline]
pub fn meters_to_px(meters: f32) -> f32 {
    meters * consts::PIXELS_PER_METER
}

/// Convert a frame scale factor to elapsed seconds
#[inline]
pub fn scale_to_secs(scale: f32) -> f32 {
    scale * consts::REFERENCE_FRAME_SECS
}
