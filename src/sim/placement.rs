//! Obstacle placement rules
//!
//! A candidate x is accepted only if it keeps the minimum separation from
//! every placed obstacle, stays out of the zone in front of the door and
//! clears the shop and door footprints by a margin. Obstacles are treated as
//! ±45 units wide for the footprint checks regardless of their real width.

use std::fmt;

use rand::Rng;

use super::entities::{Door, Obstacle, ObstacleKind, Shop, Span};
use crate::consts::*;

/// Why a candidate obstacle position was refused
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementError {
    /// Candidate ended up in the clear zone before the door
    DoorZone { x: f32 },
    /// Candidate footprint touches the shop margin
    ShopMargin { x: f32 },
    /// Candidate footprint touches the door margin
    DoorMargin { x: f32 },
    /// Still too close to another obstacle after nudging
    Crowded { x: f32 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoorZone { x } => write!(f, "x={x:.1} is inside the door clear zone"),
            Self::ShopMargin { x } => write!(f, "x={x:.1} overlaps the shop margin"),
            Self::DoorMargin { x } => write!(f, "x={x:.1} overlaps the door margin"),
            Self::Crowded { x } => write!(f, "x={x:.1} is too close to another obstacle"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// True if any obstacle is closer than `min_distance` to `x`
pub fn is_overlapping(x: f32, obstacles: &[Obstacle], min_distance: f32) -> bool {
    obstacles.iter().any(|o| (o.x - x).abs() < min_distance)
}

/// Approximate obstacle footprint used against the shop and door
fn obstacle_span(x: f32) -> Span {
    Span::centered(x, OBSTACLE_APPROX_HALF_WIDTH)
}

/// True if an obstacle at `x` would crowd the shop
pub fn obstacle_hits_shop(x: f32, shop: &Shop) -> bool {
    obstacle_span(x).overlaps(&shop.keep_out(OBSTACLE_MARGIN))
}

/// True if an obstacle at `x` would crowd the door
pub fn obstacle_hits_door(x: f32, door: &Door) -> bool {
    obstacle_span(x).overlaps(&door.keep_out(OBSTACLE_MARGIN))
}

/// True if a coin at `x` falls in the shop or door keep-out, or in front of the door
pub fn coin_blocked(x: f32, shop: &Shop, door: &Door) -> bool {
    x >= door.clear_zone_start()
        || shop.keep_out(COIN_MARGIN).contains(x)
        || door.keep_out(COIN_MARGIN).contains(x)
}

/// Trap/spike quota tracker for one stage
///
/// Half of the stage's target count should be traps and the rest spikes,
/// with spikes split evenly between small and large. Whichever category still
/// has quota is preferred; when both or neither do, the choice is a coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindAllocator {
    target_traps: u64,
    target_spikes: u64,
    traps: u64,
    spikes: u64,
}

impl KindAllocator {
    pub fn new(target_total: u64) -> Self {
        let target_traps = target_total / 2;
        Self {
            target_traps,
            target_spikes: target_total - target_traps,
            traps: 0,
            spikes: 0,
        }
    }

    /// Pick the next kind and count it
    pub fn allocate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ObstacleKind {
        let traps_left = self.traps < self.target_traps;
        let spikes_left = self.spikes < self.target_spikes;

        let trap = match (traps_left, spikes_left) {
            (true, false) => true,
            (false, true) => false,
            _ => rng.random_bool(0.5),
        };

        if trap {
            self.traps += 1;
            ObstacleKind::Trap
        } else {
            self.spikes += 1;
            if rng.random_bool(0.5) {
                ObstacleKind::SmallSpike
            } else {
                ObstacleKind::LargeSpike
            }
        }
    }

    pub fn traps(&self) -> u64 {
        self.traps
    }

    pub fn spikes(&self) -> u64 {
        self.spikes
    }
}

/// Try to add one obstacle near `x`
///
/// Overlapping candidates are nudged forward by 100-300 units up to ten
/// times. On success the obstacle is appended to `obstacles` and its final x
/// is returned.
pub fn create_safe_obstacle<R: Rng + ?Sized>(
    x: f32,
    obstacles: &mut Vec<Obstacle>,
    shop: &Shop,
    door: &Door,
    allocator: &mut KindAllocator,
    ground_y: f32,
    rng: &mut R,
) -> Result<f32, PlacementError> {
    let mut safe_x = x;
    let mut attempts = 0;
    while is_overlapping(safe_x, obstacles, OBSTACLE_MIN_SEPARATION)
        && attempts < OBSTACLE_NUDGE_ATTEMPTS
    {
        safe_x += rng.random_range(100.0..300.0);
        attempts += 1;
    }

    if safe_x >= door.clear_zone_start() {
        return Err(PlacementError::DoorZone { x: safe_x });
    }
    if obstacle_hits_shop(safe_x, shop) {
        return Err(PlacementError::ShopMargin { x: safe_x });
    }
    if obstacle_hits_door(safe_x, door) {
        return Err(PlacementError::DoorMargin { x: safe_x });
    }
    if is_overlapping(safe_x, obstacles, OBSTACLE_MIN_SEPARATION) {
        return Err(PlacementError::Crowded { x: safe_x });
    }

    let kind = allocator.allocate(rng);
    obstacles.push(Obstacle::new(kind, safe_x, ground_y));
    Ok(safe_x)
}
