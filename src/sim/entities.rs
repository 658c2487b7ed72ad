//! Stage entities: obstacles, coins, the shop and the exit door
//!
//! Every entity sits on a ground line. Positions are world units; x grows to
//! the right, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Three 25x25 teeth
    SmallSpike,
    /// Three 30x30 teeth
    LargeSpike,
    /// Open pit in the ground
    Trap,
}

impl ObstacleKind {
    pub fn width(self) -> f32 {
        match self {
            ObstacleKind::SmallSpike => 75.0,
            ObstacleKind::LargeSpike => 90.0,
            ObstacleKind::Trap => 80.0,
        }
    }

    pub fn height(self) -> f32 {
        match self {
            ObstacleKind::SmallSpike => 25.0,
            ObstacleKind::LargeSpike => 30.0,
            ObstacleKind::Trap => 60.0,
        }
    }

    pub fn is_spike(self) -> bool {
        matches!(self, ObstacleKind::SmallSpike | ObstacleKind::LargeSpike)
    }

    /// Tooth size for spike variants
    fn tooth(self) -> Option<f32> {
        match self {
            ObstacleKind::SmallSpike => Some(25.0),
            ObstacleKind::LargeSpike => Some(30.0),
            ObstacleKind::Trap => None,
        }
    }
}

/// One triangular tooth of a spike strip, relative to the obstacle's x
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeTooth {
    pub offset_x: f32,
    pub width: f32,
    pub height: f32,
}

/// A placed obstacle
///
/// Spike strips extend to the right of `x`; traps are centred on `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    /// Ground line the obstacle is anchored to
    pub ground_y: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, ground_y: f32) -> Self {
        Self { kind, x, ground_y }
    }

    pub fn small_spike(x: f32, ground_y: f32) -> Self {
        Self::new(ObstacleKind::SmallSpike, x, ground_y)
    }

    pub fn large_spike(x: f32, ground_y: f32) -> Self {
        Self::new(ObstacleKind::LargeSpike, x, ground_y)
    }

    pub fn trap(x: f32, ground_y: f32) -> Self {
        Self::new(ObstacleKind::Trap, x, ground_y)
    }

    pub fn width(&self) -> f32 {
        self.kind.width()
    }

    pub fn height(&self) -> f32 {
        self.kind.height()
    }

    /// Teeth of a spike strip (empty for traps)
    pub fn teeth(&self) -> Vec<SpikeTooth> {
        match self.kind.tooth() {
            Some(size) => (0..3)
                .map(|i| SpikeTooth {
                    offset_x: i as f32 * size,
                    width: size,
                    height: size,
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

impl Coin {
    /// Coin floating at head height above the ground
    pub fn on_ground(x: f32, ground_y: f32) -> Self {
        Self::at(x, ground_y - COIN_GROUND_LIFT)
    }

    /// Coin near the top of a jump arc
    pub fn at_jump_apex(x: f32, ground_y: f32) -> Self {
        Self::at(x, ground_y - COIN_APEX_LIFT)
    }

    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            collected: false,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(COIN_SIZE)
    }
}

/// Horizontal extent `[left, right]` of a footprint grown by a margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    pub fn centered(x: f32, half_width: f32) -> Self {
        Self {
            left: x - half_width,
            right: x + half_width,
        }
    }

    /// Open-interval overlap test
    pub fn overlaps(&self, other: &Span) -> bool {
        self.right > other.left && self.left < other.right
    }

    /// Open-interval containment test
    pub fn contains(&self, x: f32) -> bool {
        x > self.left && x < self.right
    }
}

/// The stage shop, just past the stage start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Player is browsing the catalogue
    pub is_open: bool,
}

impl Shop {
    pub fn new(x: f32, ground_y: f32) -> Self {
        Self {
            x,
            y: ground_y - SHOP_HEIGHT,
            is_open: false,
        }
    }

    /// Footprint plus `margin` on both sides
    pub fn keep_out(&self, margin: f32) -> Span {
        Span::centered(self.x, SHOP_WIDTH / 2.0 + margin)
    }
}

/// Door sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
}

/// Door transition reported by [`Door::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorTransition {
    StartedOpening,
    Opened,
}

/// The exit door at the end of a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub state: DoorState,
    /// Opening progress, 0 = shut, 1 = fully raised
    pub progress: f32,
}

impl Door {
    pub fn new(x: f32, ground_y: f32) -> Self {
        Self {
            x,
            y: ground_y - DOOR_HEIGHT,
            state: DoorState::Closed,
            progress: 0.0,
        }
    }

    /// Footprint plus `margin` on both sides
    pub fn keep_out(&self, margin: f32) -> Span {
        Span::centered(self.x, DOOR_WIDTH / 2.0 + margin)
    }

    /// Start of the no-placement zone in front of the door
    pub fn clear_zone_start(&self) -> f32 {
        self.x - DOOR_CLEAR_ZONE
    }

    /// How far the door panel has risen
    pub fn open_height(&self) -> f32 {
        (self.progress * DOOR_HEIGHT).min(DOOR_HEIGHT)
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    /// Advance the door for one frame
    ///
    /// `scale` is the frame's elapsed-time scale (1.0 = reference rate).
    pub fn update(&mut self, player_x: f32, scale: f32) -> Option<DoorTransition> {
        let mut transition = None;

        if self.state == DoorState::Closed && (self.x - player_x).abs() < DOOR_TRIGGER_DISTANCE {
            self.state = DoorState::Opening;
            self.progress = 0.0;
            transition = Some(DoorTransition::StartedOpening);
        }

        if self.state == DoorState::Opening {
            self.progress += DOOR_OPEN_RATE * scale;
            if self.open_height() >= DOOR_HEIGHT {
                self.progress = 1.0;
                self.state = DoorState::Open;
                transition = Some(DoorTransition::Opened);
            }
        }

        transition
    }
}
